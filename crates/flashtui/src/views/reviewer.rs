//! Card review.
//!
//! ```text
//! row 0        header (key help)
//! row 1        ------------------------
//! row 2         [deck 1 of 2]      Geography      1 0 2
//! row 3        ~~~~~~~~~~~~~~~~~~~~~~~~
//! rows 4..r-2  card, wrapped and centred
//! row r-2      ------------------------
//! row r-1      footer
//! ```

use flashtui_core::{AttributedRun, KeyCode, KeyEvent};
use flashtui_text::parse_card;
use flashtui_text::render::escape;
use flashtui_widgets::align::print_aligned;
use flashtui_widgets::chrome::draw_chrome;
use flashtui_widgets::{Align, Bindings, Outcome, ParentLink, TextPad, View, dispatch};

use crate::app::App;
use crate::collection::{Card, DeckInfo, Ease, Queue};
use crate::error::{Error, Result};

const HEAD: &str =
    "Reviewer  |  Hq=back  &lt;space&gt;=flip  jk=scroll  1a=again  2h=hard  3g=good  4e=easy";
const STATUS_ROW: u16 = 2;
const RULE_ROW: u16 = 3;
const CARD_TOP: u16 = 4;

fn card_height(rows: u16) -> usize {
    usize::from(rows.saturating_sub(6)).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Back,
    Flip,
    Answer(Ease),
    ScrollDown,
    ScrollUp,
}

/// Shows the due cards of one or more decks, deck after deck.
#[derive(Debug)]
pub struct Reviewer {
    decks: Vec<DeckInfo>,
    position: usize,
    card: Option<Card>,
    showing_answer: bool,
    pad: TextPad,
    size: (u16, u16),
    answered: usize,
    foot: String,
    dirty: bool,
    parent: ParentLink<'static, App, Error>,
}

impl Reviewer {
    #[must_use]
    pub fn new(decks: Vec<DeckInfo>) -> Self {
        Self {
            decks,
            position: 0,
            card: None,
            showing_answer: false,
            pad: TextPad::new(1),
            size: (0, 0),
            answered: 0,
            foot: String::new(),
            dirty: true,
            parent: ParentLink::root(),
        }
    }

    /// Review until the decks run out of due cards or the user leaves.
    /// Returns the number of cards answered. The collection is saved
    /// either way.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and collection errors.
    pub fn run(&mut self, app: &mut App) -> Result<usize> {
        let reviewed = self.review(app);
        let saved = app.collection.save();
        reviewed?;
        saved?;
        tracing::info!(answered = self.answered, "review finished");
        Ok(self.answered)
    }

    #[must_use]
    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    #[must_use]
    pub fn showing_answer(&self) -> bool {
        self.showing_answer
    }

    fn review(&mut self, app: &mut App) -> Result<()> {
        if !self.load_next(app)? {
            return Ok(());
        }
        loop {
            if app.size() != self.size {
                self.layout(app);
                self.dirty = true;
            }
            if std::mem::take(&mut self.dirty) {
                draw_chrome(app.surface.as_mut(), &app.tags, HEAD, &self.foot)?;
                self.draw_status(app)?;
            }
            self.pad.draw(app.surface.as_mut(), CARD_TOP, Align::Center)?;
            app.surface.flush()?;

            let key = app.surface.read_key()?;
            if dispatch(self, key, app)? == Outcome::Terminate || app.quitting {
                return Ok(());
            }
        }
    }

    /// Show the next due card, moving on through the decks. `false` once
    /// every deck is done.
    fn load_next(&mut self, app: &mut App) -> Result<bool> {
        while let Some(deck) = self.decks.get(self.position) {
            app.collection.set_current_deck(deck.id)?;
            if let Some(card) = app.collection.next_card()? {
                tracing::debug!(card = card.id, deck = %deck.name, "showing card");
                self.card = Some(card);
                self.showing_answer = false;
                self.layout(app);
                self.dirty = true;
                return Ok(true);
            }
            self.position += 1;
        }
        self.card = None;
        Ok(false)
    }

    /// Wrap the current side of the card to the screen.
    fn layout(&mut self, app: &App) {
        let (rows, cols) = app.size();
        self.size = (rows, cols);
        self.pad.set_height(card_height(rows));
        let Some(card) = &self.card else {
            self.pad.set_lines(Vec::new());
            return;
        };
        let side = if self.showing_answer {
            &card.answer
        } else {
            &card.question
        };
        let markup = parse_card(side).unwrap_or_else(|err| {
            tracing::warn!(card = card.id, %err, "cannot display card");
            escape(&format!("Cannot display card: {err}"))
        });
        self.pad.set_markup(&markup, &app.tags, usize::from(cols));
    }

    fn draw_status(&self, app: &mut App) -> Result<()> {
        let (_, cols) = app.size();
        let Some(deck) = self.decks.get(self.position) else {
            return Ok(());
        };
        let surface = app.surface.as_mut();
        surface.clear_region(STATUS_ROW, 1)?;

        let place = format!(" [deck {} of {}]", self.position + 1, self.decks.len());
        print_aligned(surface, &app.tags, STATUS_ROW, Align::Left, &escape(&place))?;
        let name = format!("<u>{}</u>", escape(&deck.name));
        print_aligned(surface, &app.tags, STATUS_ROW, Align::Center, &name)?;

        let queue = self.card.as_ref().map(|card| card.queue);
        let count = |q: Queue, n: usize| {
            if queue == Some(q) {
                format!("<u>{n}</u>")
            } else {
                n.to_string()
            }
        };
        let c = app.collection.counts();
        let counts = format!(
            "<blue>{}</blue> <red>{}</red> <green>{}</green> ",
            count(Queue::New, c.new),
            count(Queue::Learning, c.learning),
            count(Queue::Review, c.review)
        );
        print_aligned(surface, &app.tags, STATUS_ROW, Align::Right, &counts)?;

        let rule = vec![AttributedRun::plain('~'); usize::from(cols)];
        surface.draw(RULE_ROW, 0, &rule)?;
        Ok(())
    }
}

impl View for Reviewer {
    fn header(&self) -> &str {
        HEAD
    }

    fn footer(&self) -> &str {
        &self.foot
    }

    fn set_footer(&mut self, footer: String) {
        self.foot = footer;
        self.dirty = true;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Bindings<'static, App, Error> for Reviewer {
    type Command = ReviewCommand;

    fn binding(&self, key: &KeyEvent) -> Option<ReviewCommand> {
        if key.ctrl() || key.alt() {
            return None;
        }
        let cmd = match key.code {
            KeyCode::Char('H' | 'q') => ReviewCommand::Back,
            KeyCode::Char(' ') => ReviewCommand::Flip,
            KeyCode::Char('a' | '1') => ReviewCommand::Answer(Ease::Again),
            KeyCode::Char('h' | '2') => ReviewCommand::Answer(Ease::Hard),
            KeyCode::Char('g' | '3') => ReviewCommand::Answer(Ease::Good),
            KeyCode::Char('e' | '4') => ReviewCommand::Answer(Ease::Easy),
            KeyCode::Char('j') | KeyCode::Down => ReviewCommand::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => ReviewCommand::ScrollUp,
            _ => return None,
        };
        Some(cmd)
    }

    fn defers(&self, _key: &KeyEvent) -> bool {
        false
    }

    fn execute(
        &mut self,
        cmd: ReviewCommand,
        _leaf: Option<&mut dyn View>,
        app: &mut App,
    ) -> Result<Outcome> {
        match cmd {
            ReviewCommand::Back => return Ok(Outcome::Terminate),
            ReviewCommand::Flip => {
                self.showing_answer = !self.showing_answer;
                self.layout(app);
            }
            ReviewCommand::Answer(ease) => {
                if let Some(card) = self.card.take() {
                    app.collection.answer_card(card.id, ease)?;
                    self.answered += 1;
                    tracing::debug!(card = card.id, ?ease, "answered");
                    if !self.load_next(app)? {
                        return Ok(Outcome::Terminate);
                    }
                }
            }
            ReviewCommand::ScrollDown => {
                self.pad.scroll_down();
            }
            ReviewCommand::ScrollUp => {
                self.pad.scroll_up();
            }
        }
        Ok(Outcome::Continue)
    }

    fn parent(&mut self) -> &mut ParentLink<'static, App, Error> {
        &mut self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::testing::TestApp;

    fn decks(t: &TestApp, names: &[&str]) -> Vec<DeckInfo> {
        let all = t.app.collection.decks().unwrap();
        names
            .iter()
            .map(|name| all.iter().find(|d| d.name == *name).unwrap().clone())
            .collect()
    }

    #[test]
    fn shows_question_then_answer() {
        let mut t = TestApp::new(" q");
        let mut reviewer = Reviewer::new(decks(&t, &["Art"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 0);

        // learning before review: Starry Night comes first
        assert!(reviewer.showing_answer());
        assert_eq!(reviewer.card().map(|c| c.id), Some(102));
        let screen = t.screen();
        assert!(screen.contains("Starry Night"));
        assert!(screen.contains("van Gogh"));
    }

    #[test]
    fn status_row_and_rule() {
        let mut t = TestApp::new("q");
        let mut reviewer = Reviewer::new(decks(&t, &["Art"]));
        reviewer.run(&mut t.app).unwrap();

        let status = t.row_text(STATUS_ROW);
        assert!(status.starts_with(" [deck 1 of 1]"));
        assert!(status.contains("Art"));
        assert!(status.ends_with("0 1 1"));
        assert_eq!(t.row_text(RULE_ROW), "~".repeat(80));
        assert!(t.row_text(0).starts_with("Reviewer  |  Hq=back  <space>=flip"));
    }

    #[test]
    fn answering_walks_the_queue_and_saves() {
        let mut t = TestApp::new("34");
        let mut reviewer = Reviewer::new(decks(&t, &["Art"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 2);
        assert_eq!(reviewer.card(), None);

        let mut saved = t.saved();
        let art = saved.decks().unwrap().into_iter().find(|d| d.name == "Art").unwrap();
        assert!(art.counts.is_empty());
        saved.set_current_deck(art.id).unwrap();
        assert_eq!(saved.next_card().unwrap(), None);
    }

    #[test]
    fn again_keeps_card_in_deck() {
        let mut t = TestApp::new("1q");
        let mut reviewer = Reviewer::new(decks(&t, &["Art"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 1);
        // 102 went back to learning, which still sorts before review
        assert_eq!(reviewer.card().map(|c| c.id), Some(102));
    }

    #[test]
    fn moves_on_to_next_deck() {
        let mut t = TestApp::new("33q");
        let mut reviewer = Reviewer::new(decks(&t, &["Art", "Geography"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 2);

        assert_eq!(reviewer.card().map(|c| c.id), Some(100));
        assert!(t.row_text(STATUS_ROW).starts_with(" [deck 2 of 2]"));
        assert!(t.row_text(STATUS_ROW).contains("Geography"));
        assert!(t.screen().contains("[...] is in France"));
    }

    #[test]
    fn deck_without_due_cards_reads_no_keys() {
        let mut t = TestApp::new("q");
        let mut reviewer = Reviewer::new(decks(&t, &["Art::Modern"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 0);
        assert_eq!(t.pending_keys(), 1);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut t = TestApp::new("xz:q");
        let mut reviewer = Reviewer::new(decks(&t, &["Geography"]));
        assert_eq!(reviewer.run(&mut t.app).unwrap(), 0);
        assert_eq!(t.pending_keys(), 0);
        assert!(!reviewer.showing_answer());
    }
}
