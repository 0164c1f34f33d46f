//! Scripted apps for view tests.

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use flashtui_core::{AttributedRun, HeadlessSurface, KeyCode, KeyEvent, Surface};
use tempfile::TempDir;

use crate::app::App;
use crate::collection::JsonCollection;
use crate::config::Config;

pub(crate) const ESC: char = '\x1b';

pub(crate) const SAMPLE: &str = r#"{
    "decks": [
        { "id": 1, "name": "Geography" },
        { "id": 2, "name": "Default" },
        { "id": 3, "name": "Art" },
        { "id": 4, "name": "Art::Modern" }
    ],
    "notes": [
        { "id": 10, "kind": "cloze", "fields": ["{{c1::Paris}} is in France", "capital"] },
        { "id": 11, "fields": ["Mona Lisa", "da <b>Vinci</b>"] },
        { "id": 12, "fields": ["Starry Night", "van Gogh"] },
        { "id": 13, "fields": ["Guernica", "Picasso"] }
    ],
    "cards": [
        { "id": 100, "note": 10, "deck": 1, "ord": 1 },
        { "id": 101, "note": 11, "deck": 3, "queue": "review", "due": 5 },
        { "id": 102, "note": 12, "deck": 3, "queue": "learning" },
        { "id": 103, "note": 12, "deck": 1, "queue": "review", "due": 50 },
        { "id": 104, "note": 13, "deck": 4, "queue": "review", "due": 90 }
    ]
}"#;

/// A [`Surface`] the test keeps a handle to after the app takes it.
struct Shared(Rc<RefCell<HeadlessSurface>>);

impl Surface for Shared {
    fn measure(&self) -> (u16, u16) {
        self.0.borrow().measure()
    }

    fn draw(&mut self, row: u16, col: u16, runs: &[AttributedRun]) -> io::Result<()> {
        self.0.borrow_mut().draw(row, col, runs)
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.0.borrow_mut().read_key()
    }

    fn clear_region(&mut self, top: u16, height: u16) -> io::Result<()> {
        self.0.borrow_mut().clear_region(top, height)
    }

    fn set_cursor(&mut self, at: Option<(u16, u16)>) -> io::Result<()> {
        self.0.borrow_mut().set_cursor(at)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.0.borrow_mut().suspend()
    }

    fn resume(&mut self) -> io::Result<()> {
        self.0.borrow_mut().resume()
    }

    fn supports_color(&self) -> bool {
        self.0.borrow().supports_color()
    }
}

/// `\n` is Enter and [`ESC`] is Escape; every other char is itself.
pub(crate) fn keys(script: &str) -> Vec<KeyEvent> {
    script
        .chars()
        .map(|c| match c {
            '\n' => KeyEvent::new(KeyCode::Enter),
            ESC => KeyEvent::new(KeyCode::Escape),
            c => KeyEvent::char(c),
        })
        .collect()
}

pub(crate) struct TestApp {
    pub app: App,
    surface: Rc<RefCell<HeadlessSurface>>,
    path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    /// The sample collection on a 24x80 screen, reading `script`.
    pub fn new(script: &str) -> Self {
        Self::with_config(script, Config::default())
    }

    /// The sample collection, written to a fresh directory so it can be
    /// saved.
    pub fn with_config(script: &str, config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("col.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let collection = JsonCollection::open(&path).unwrap().with_today(10);
        let surface = Rc::new(RefCell::new(
            HeadlessSurface::new(24, 80).with_keys(keys(script)),
        ));
        let app = App::new(
            Box::new(Shared(Rc::clone(&surface))),
            Box::new(collection),
            config,
        );
        Self {
            app,
            surface,
            path,
            _dir: dir,
        }
    }

    /// The collection as last saved.
    pub fn saved(&self) -> JsonCollection {
        JsonCollection::open(&self.path).unwrap().with_today(10)
    }

    pub fn rows(&self) -> u16 {
        self.surface.borrow().measure().0
    }

    pub fn row_text(&self, row: u16) -> String {
        self.surface.borrow().row_text(row)
    }

    pub fn screen(&self) -> String {
        self.surface.borrow().screen_text()
    }

    pub fn pending_keys(&self) -> usize {
        self.surface.borrow().pending_keys()
    }

    pub fn suspend_count(&self) -> usize {
        self.surface.borrow().suspend_count()
    }
}
