#![forbid(unsafe_code)]

//! Hierarchical key dispatch.
//!
//! Views form a chain that mirrors the call stack of their modal loops: a
//! view running its loop holds a [`ParentLink`] to the view that started it.
//! A key is routed as follows:
//!
//! 1. the focused view's own binding table turns it into a command, which
//!    the view executes;
//! 2. otherwise, if the view defers the key and has a parent, the parent
//!    receives it through [`KeyHandler::handle_forwarded`] together with the
//!    focused view (the *leaf*), and repeats from step 1 with the same leaf;
//! 3. otherwise nothing happens and the loop continues.
//!
//! The dispatcher itself never mutates anything: all effects come from the
//! `execute` implementations, and so do all errors.
//!
//! # Ownership
//!
//! A `ParentLink` is a `&mut` borrow of the parent, valid for exactly as long
//! as the child lives. While a key is forwarded the link is taken out of the
//! child, so the child can be lent to the parent as the leaf, and put back
//! afterwards.

use flashtui_core::KeyEvent;

/// What a view's loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading keys.
    Continue,
    /// Leave the view's modal loop.
    Terminate,
}

/// The parts of the focused view an ancestor may touch while handling a
/// forwarded key.
pub trait View {
    /// Header line (render markup).
    fn header(&self) -> &str;

    /// Footer / status line (render markup).
    fn footer(&self) -> &str;

    fn set_footer(&mut self, footer: String);

    /// Request a full redraw before the next key is read.
    fn mark_dirty(&mut self);
}

/// A view that can receive keys forwarded by a descendant.
///
/// Implementations delegate to [`forward`].
pub trait KeyHandler<C: ?Sized, E> {
    fn handle_forwarded(
        &mut self,
        key: KeyEvent,
        leaf: &mut dyn View,
        cx: &mut C,
    ) -> Result<Outcome, E>;
}

/// A view's binding table and its link to the parent view.
pub trait Bindings<'p, C: ?Sized, E>: View {
    /// The commands this view understands.
    type Command: Copy;

    /// The command bound to `key`, if any.
    fn binding(&self, key: &KeyEvent) -> Option<Self::Command>;

    /// Whether an unbound `key` should go to the parent.
    fn defers(&self, key: &KeyEvent) -> bool;

    /// Run `cmd`. `leaf` is the focused descendant when the key was forwarded,
    /// `None` when this view is itself focused.
    fn execute(
        &mut self,
        cmd: Self::Command,
        leaf: Option<&mut dyn View>,
        cx: &mut C,
    ) -> Result<Outcome, E>;

    fn parent(&mut self) -> &mut ParentLink<'p, C, E>;
}

/// Non-owning link from a view to the view whose loop started it.
pub struct ParentLink<'p, C: ?Sized, E>(Option<&'p mut dyn KeyHandler<C, E>>);

impl<'p, C: ?Sized, E> ParentLink<'p, C, E> {
    /// Link of a view with no parent.
    #[must_use]
    pub fn root() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn new(parent: &'p mut dyn KeyHandler<C, E>) -> Self {
        Self(Some(parent))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }
}

impl<C: ?Sized, E> std::fmt::Debug for ParentLink<'_, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParentLink")
            .field(&if self.is_root() { "root" } else { "linked" })
            .finish()
    }
}

/// Route `key` from the focused `view`.
///
/// # Errors
///
/// Whatever the executing view's handler returns.
pub fn dispatch<'p, V, C, E>(view: &mut V, key: KeyEvent, cx: &mut C) -> Result<Outcome, E>
where
    V: Bindings<'p, C, E>,
    C: ?Sized + 'p,
    E: 'p,
{
    if let Some(cmd) = view.binding(&key) {
        flashtui_core::trace!(?key, "handled by focused view");
        return view.execute(cmd, None, cx);
    }
    if !view.defers(&key) {
        return Ok(Outcome::Continue);
    }
    let Some(parent) = view.parent().0.take() else {
        return Ok(Outcome::Continue);
    };
    flashtui_core::trace!(?key, "forwarded to parent");
    let result = parent.handle_forwarded(key, view, cx);
    view.parent().0 = Some(parent);
    result
}

/// Route a key forwarded to `view` on behalf of `leaf`.
///
/// This is the body of every [`KeyHandler::handle_forwarded`].
///
/// # Errors
///
/// Whatever the executing view's handler returns.
pub fn forward<'p, V, C, E>(
    view: &mut V,
    key: KeyEvent,
    leaf: &mut dyn View,
    cx: &mut C,
) -> Result<Outcome, E>
where
    V: Bindings<'p, C, E>,
    C: ?Sized + 'p,
    E: 'p,
{
    if let Some(cmd) = view.binding(&key) {
        return view.execute(cmd, Some(leaf), cx);
    }
    if !view.defers(&key) {
        return Ok(Outcome::Continue);
    }
    match view.parent().0.as_deref_mut() {
        Some(parent) => parent.handle_forwarded(key, leaf, cx),
        None => Ok(Outcome::Continue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    struct Node<'p> {
        name: &'static str,
        own: &'static [char],
        deferred: &'static [char],
        footer: String,
        dirty: bool,
        parent: ParentLink<'p, Log, String>,
    }

    impl<'p> Node<'p> {
        fn new(
            name: &'static str,
            own: &'static [char],
            deferred: &'static [char],
            parent: ParentLink<'p, Log, String>,
        ) -> Self {
            Self {
                name,
                own,
                deferred,
                footer: String::new(),
                dirty: false,
                parent,
            }
        }
    }

    impl View for Node<'_> {
        fn header(&self) -> &str {
            self.name
        }

        fn footer(&self) -> &str {
            &self.footer
        }

        fn set_footer(&mut self, footer: String) {
            self.footer = footer;
        }

        fn mark_dirty(&mut self) {
            self.dirty = true;
        }
    }

    impl<'p> Bindings<'p, Log, String> for Node<'p> {
        type Command = char;

        fn binding(&self, key: &KeyEvent) -> Option<char> {
            match key.code {
                flashtui_core::KeyCode::Char(c) if self.own.contains(&c) => Some(c),
                _ => None,
            }
        }

        fn defers(&self, key: &KeyEvent) -> bool {
            matches!(key.code, flashtui_core::KeyCode::Char(c) if self.deferred.contains(&c))
        }

        fn execute(
            &mut self,
            cmd: char,
            leaf: Option<&mut dyn View>,
            cx: &mut Log,
        ) -> Result<Outcome, String> {
            if cmd == '!' {
                return Err(format!("{} failed", self.name));
            }
            match leaf {
                Some(leaf) => {
                    cx.push(format!("{}:{cmd}:for {}", self.name, leaf.header()));
                    leaf.set_footer(format!("set by {}", self.name));
                    leaf.mark_dirty();
                }
                None => cx.push(format!("{}:{cmd}", self.name)),
            }
            Ok(if cmd == 'q' {
                Outcome::Terminate
            } else {
                Outcome::Continue
            })
        }

        fn parent(&mut self) -> &mut ParentLink<'p, Log, String> {
            &mut self.parent
        }
    }

    impl KeyHandler<Log, String> for Node<'_> {
        fn handle_forwarded(
            &mut self,
            key: KeyEvent,
            leaf: &mut dyn View,
            cx: &mut Log,
        ) -> Result<Outcome, String> {
            forward(self, key, leaf, cx)
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::char(c)
    }

    #[test]
    fn own_binding_runs_without_leaf() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['q'], &[], ParentLink::root());
        let outcome = dispatch(&mut root, key('q'), &mut log).unwrap();
        assert_eq!(outcome, Outcome::Terminate);
        assert_eq!(log, vec!["root:q"]);
    }

    #[test]
    fn unbound_key_continues_silently() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['q'], &['z'], ParentLink::root());
        assert_eq!(dispatch(&mut root, key('x'), &mut log).unwrap(), Outcome::Continue);
        // Deferred but no parent.
        assert_eq!(dispatch(&mut root, key('z'), &mut log).unwrap(), Outcome::Continue);
        assert!(log.is_empty());
    }

    #[test]
    fn deferred_key_reaches_parent_with_leaf() {
        let mut log = Log::new();
        let mut root = Node::new("root", &[':'], &[], ParentLink::root());
        let mut child = Node::new("child", &['j'], &[':'], ParentLink::new(&mut root));

        assert_eq!(dispatch(&mut child, key(':'), &mut log).unwrap(), Outcome::Continue);
        assert_eq!(log, vec!["root:::for child"]);
        assert_eq!(child.footer, "set by root");
        assert!(child.dirty);
        // Link restored after forwarding.
        assert!(!child.parent.is_root());
    }

    #[test]
    fn non_deferred_key_is_not_forwarded() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['x'], &[], ParentLink::root());
        let mut child = Node::new("child", &[], &[':'], ParentLink::new(&mut root));
        assert_eq!(dispatch(&mut child, key('x'), &mut log).unwrap(), Outcome::Continue);
        assert!(log.is_empty());
    }

    #[test]
    fn own_binding_shadows_parent() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['q'], &[], ParentLink::root());
        let mut child = Node::new("child", &['q'], &['q'], ParentLink::new(&mut root));
        dispatch(&mut child, key('q'), &mut log).unwrap();
        assert_eq!(log, vec!["child:q"]);
    }

    #[test]
    fn three_level_chain_keeps_original_leaf() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['r'], &[], ParentLink::root());
        let mut mid = Node::new("mid", &['m'], &['r'], ParentLink::new(&mut root));
        let mut leaf = Node::new("leaf", &['j'], &['r', 'm', 'x'], ParentLink::new(&mut mid));

        dispatch(&mut leaf, key('m'), &mut log).unwrap();
        dispatch(&mut leaf, key('r'), &mut log).unwrap();
        // 'x' is deferred by the leaf but not by mid: stops there.
        dispatch(&mut leaf, key('x'), &mut log).unwrap();
        dispatch(&mut leaf, key('j'), &mut log).unwrap();

        assert_eq!(
            log,
            vec!["mid:m:for leaf", "root:r:for leaf", "leaf:j"]
        );
    }

    #[test]
    fn parent_terminate_propagates_to_leaf_loop() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['q'], &[], ParentLink::root());
        let mut child = Node::new("child", &[], &['q'], ParentLink::new(&mut root));
        assert_eq!(dispatch(&mut child, key('q'), &mut log).unwrap(), Outcome::Terminate);
    }

    /// Context and error types that borrow from the test's stack frame.
    struct Tally<'a>(&'a mut usize);

    struct Counter<'p, 'a> {
        parent: ParentLink<'p, Tally<'a>, &'a str>,
    }

    impl View for Counter<'_, '_> {
        fn header(&self) -> &str {
            "counter"
        }

        fn footer(&self) -> &str {
            ""
        }

        fn set_footer(&mut self, _footer: String) {}

        fn mark_dirty(&mut self) {}
    }

    impl<'p, 'a> Bindings<'p, Tally<'a>, &'a str> for Counter<'p, 'a> {
        type Command = ();

        fn binding(&self, key: &KeyEvent) -> Option<()> {
            (key.is_char('+') && self.parent.is_root()).then_some(())
        }

        fn defers(&self, key: &KeyEvent) -> bool {
            key.is_char('+')
        }

        fn execute(
            &mut self,
            _cmd: (),
            _leaf: Option<&mut dyn View>,
            cx: &mut Tally<'a>,
        ) -> Result<Outcome, &'a str> {
            *cx.0 += 1;
            Ok(Outcome::Continue)
        }

        fn parent(&mut self) -> &mut ParentLink<'p, Tally<'a>, &'a str> {
            &mut self.parent
        }
    }

    impl<'a> KeyHandler<Tally<'a>, &'a str> for Counter<'_, 'a> {
        fn handle_forwarded(
            &mut self,
            key: KeyEvent,
            leaf: &mut dyn View,
            cx: &mut Tally<'a>,
        ) -> Result<Outcome, &'a str> {
            forward(self, key, leaf, cx)
        }
    }

    #[test]
    fn borrowed_context_is_routed_through_the_chain() {
        let mut count = 0;
        {
            let mut tally = Tally(&mut count);
            let mut root = Counter {
                parent: ParentLink::root(),
            };
            let mut child = Counter {
                parent: ParentLink::new(&mut root),
            };
            assert_eq!(dispatch(&mut child, key('+'), &mut tally), Ok(Outcome::Continue));
            assert_eq!(dispatch(&mut child, key('-'), &mut tally), Ok(Outcome::Continue));
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn handler_errors_propagate_and_link_is_restored() {
        let mut log = Log::new();
        let mut root = Node::new("root", &['!'], &[], ParentLink::root());
        let mut child = Node::new("child", &[], &['!'], ParentLink::new(&mut root));
        assert_eq!(
            dispatch(&mut child, key('!'), &mut log),
            Err("root failed".to_string())
        );
        assert!(!child.parent.is_root());
    }
}
