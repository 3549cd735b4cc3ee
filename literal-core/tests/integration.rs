//! Integration Tests for Mounted Trees
//!
//! These tests mount component trees on a headless surface and drive frames
//! by hand to check scheduling, compositing and lifecycle together.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use literal_core::{
    derived, writable, BufferSurface, ChildSpec, ColorSpan, ColorStyle, Component, Error,
    FrameOutcome, InputCapture, InputWidget, Literal, ManualClock, MountHandle, MountOptions,
    PassKind, Palette, PixelSize, Point, Rendered, Setter, Writable,
};

fn mount<P: 'static>(
    surface: &BufferSurface,
    clock: &ManualClock,
    component: &Component<P>,
    props: P,
) -> MountHandle {
    let options = MountOptions::new(surface.clone()).clock(clock.clone());
    match Literal::new(options) {
        Ok(literal) => literal.mount(component, props),
        Err(err) => panic!("mount failed: {err}"),
    }
}

fn rows(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|r| r.to_string()).collect()
}

/// Holds a value produced inside a render so the test can reach it.
fn slot<T>() -> Rc<RefCell<Option<T>>> {
    Rc::new(RefCell::new(None))
}

#[test]
fn reactive_child_text_updates_only_its_substring() {
    let text = writable(rows(&["abc"]));
    let root_renders = Rc::new(Cell::new(0));

    let label = Component::new("label", |_, text: &Writable<Vec<String>>| {
        Rendered::text(text.clone())
    });
    let mark = Component::new("mark", |_, _: &()| Rendered::text(rows(&["Z"])));

    let renders = root_renders.clone();
    let label_text = text.clone();
    let root = Component::new("root", move |ctx, _: &()| {
        renders.set(renders.get() + 1);
        Rendered::text(rows(&["<.....>"])).with_children(vec![
            ctx.child(ChildSpec::new(&label, label_text.clone()).at(Point::new(1, 0))),
            ctx.child(ChildSpec::new(&mark, ()).at(Point::new(5, 0))),
        ])
    });

    let surface = BufferSurface::with_grid(7, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.last_frame(), Some(rows(&["<abc.Z>"])));

    text.set(rows(&["xyz"]));
    text.set(rows(&["pqr"]));
    text.set(rows(&["def"]));
    assert_eq!(clock.requests(), 1);
    assert!(handle.is_scheduled());

    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Recompose));
    assert_eq!(surface.last_frame(), Some(rows(&["<def.Z>"])));
    assert_eq!(surface.frame_count(), 2);
    assert_eq!(root_renders.get(), 1);

    assert_eq!(handle.tick(), FrameOutcome::Idle);
    assert_eq!(surface.frame_count(), 2);
}

#[test]
fn zero_size_skips_until_geometry_recovers() {
    let root = Component::new("fill", |ctx, _: &()| {
        Rendered::text(literal_core::util::rows_with(ctx.height(), |_| {
            ".".repeat(ctx.width())
        }))
    });

    let surface = BufferSurface::with_grid(3, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.frame_count(), 1);

    handle.resize_container(PixelSize::new(0.0, 0.0));
    assert_eq!(handle.tick(), FrameOutcome::Skipped);
    assert_eq!(surface.frame_count(), 1);

    handle.resize_container(PixelSize::new(16.0, 32.0));
    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Full));
    assert_eq!(surface.last_frame(), Some(rows(&["..", ".."])));
}

#[test]
fn state_changes_rerender_the_tree() {
    let setter: Rc<RefCell<Option<Setter<u32>>>> = slot();

    let s = setter.clone();
    let counter = Component::new("counter", move |_, _: &()| Rendered::default().on_destroy(|| {}));
    let root = Component::new("root", move |ctx, _: &()| {
        let (count, set) = ctx.use_state(0u32);
        *s.borrow_mut() = Some(set);
        let _ = ctx.child(ChildSpec::new(&counter, ()));
        Rendered::text(vec![format!("{count:>3}")])
    });

    let surface = BufferSurface::with_grid(3, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.last_frame(), Some(rows(&["  0"])));

    if let Some(set) = setter.borrow().as_ref() {
        set.update(|n| n + 41);
        set.update(|n| n + 1);
    }
    assert_eq!(clock.requests(), 1);
    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Full));
    assert_eq!(surface.last_frame(), Some(rows(&[" 42"])));
}

#[test]
fn removed_children_run_their_last_hook_once() {
    let show: Rc<RefCell<Option<Writable<bool>>>> = slot();
    let destroyed = Rc::new(Cell::new(0));

    let d = destroyed.clone();
    let leaf = Component::new("leaf", move |_, _: &()| {
        let d = d.clone();
        Rendered::text(rows(&["L"])).on_destroy(move || d.set(d.get() + 1))
    });

    let s = show.clone();
    let root = Component::new("root", move |ctx, _: &()| {
        let visible = ctx.use_named_store("visible", true);
        *s.borrow_mut() = Some(visible.clone());
        let children = if visible.get() {
            vec![ctx.child(ChildSpec::new(&leaf, ()))]
        } else {
            Vec::new()
        };
        Rendered::text(rows(&["."])).with_children(children)
    });

    let surface = BufferSurface::with_grid(1, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.last_frame(), Some(rows(&["L"])));

    // A re-render releases the hook of the render it replaced.
    handle.invalidate();
    handle.tick();
    assert_eq!(destroyed.get(), 1);

    let visible = show.borrow().clone();
    if let Some(visible) = visible {
        visible.set(false);
    }
    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Full));
    assert_eq!(surface.last_frame(), Some(rows(&["."])));
    assert_eq!(destroyed.get(), 2);

    handle.invalidate();
    handle.tick();
    handle.unmount();
    assert_eq!(destroyed.get(), 2);
}

/// Components that acquire something on every render and release it in
/// their destroy hook must not accumulate it across passes.
#[test]
fn per_render_resources_are_released() {
    let live = Rc::new(Cell::new(0i32));

    let l = live.clone();
    let ticker = Component::new("ticker", move |_, _: &()| {
        l.set(l.get() + 1);
        let l = l.clone();
        Rendered::text(rows(&["t"])).on_destroy(move || l.set(l.get() - 1))
    });
    let root = Component::new("root", move |ctx, _: &()| {
        Rendered::text(rows(&[" "])).with_children(vec![ctx.child(ChildSpec::new(&ticker, ()))])
    });

    let surface = BufferSurface::with_grid(1, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(live.get(), 1);

    for _ in 0..5 {
        handle.invalidate();
        assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Full));
        assert_eq!(live.get(), 1);
    }

    handle.unmount();
    assert_eq!(live.get(), 0);
}

#[test]
fn unmount_destroys_children_before_parents() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = order.clone();
    let leaf = Component::new("leaf", move |_, _: &()| {
        let o = o.clone();
        Rendered::default().on_destroy(move || o.borrow_mut().push("leaf"))
    });
    let o = order.clone();
    let root = Component::new("root", move |ctx, _: &()| {
        let o = o.clone();
        Rendered::text(rows(&["  "]))
            .with_children(vec![ctx.child(ChildSpec::new(&leaf, ()))])
            .on_destroy(move || o.borrow_mut().push("root"))
    });

    let surface = BufferSurface::with_grid(2, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    handle.resize_container(PixelSize::new(8.0, 16.0));
    assert!(handle.is_scheduled());

    handle.unmount();
    assert_eq!(*order.borrow(), vec!["leaf", "root"]);
    assert_eq!(clock.cancels(), 1);
    assert!(!surface.is_attached());
}

#[test]
fn positional_slots_stay_stable_across_renders() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let s = seen.clone();
    let blinker = Component::new("blinker", move |ctx, _: &()| {
        let text = ctx.use_store(String::from("cursor"));
        let blink = ctx.use_store(false);
        blink.update(|on| !on);
        s.borrow_mut().push((text.get(), blink.get()));
        Rendered::text(vec![if blink.get() { "_".into() } else { " ".into() }])
    });

    let surface = BufferSurface::with_grid(1, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &blinker, ());
    for _ in 0..100 {
        handle.invalidate();
        handle.tick();
    }

    let seen = seen.borrow();
    assert_eq!(seen.len(), 101);
    for (index, (text, blink)) in seen.iter().enumerate() {
        assert_eq!(text, "cursor");
        assert_eq!(*blink, index % 2 == 0);
    }
}

#[test]
fn keyed_children_keep_separate_state() {
    let counter = Component::new("counter", |ctx, label: &char| {
        let renders = ctx.use_named_store("renders", 0u32);
        renders.update(|n| n + 1);
        Rendered::text(vec![format!("{label}{}", renders.get())])
    });
    let root = Component::new("root", move |ctx, _: &()| {
        Rendered::text(rows(&["    "])).with_children(vec![
            ctx.child(ChildSpec::new(&counter, 'a').key("left").at(Point::new(0, 0))),
            ctx.child(ChildSpec::new(&counter, 'b').key("right").at(Point::new(2, 0))),
        ])
    });

    let surface = BufferSurface::with_grid(4, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.last_frame(), Some(rows(&["a1b1"])));

    handle.invalidate();
    handle.tick();
    assert_eq!(surface.last_frame(), Some(rows(&["a2b2"])));
}

#[test]
fn colors_are_placed_at_grid_coordinates() {
    let cell = Component::new("cell", |ctx, _: &()| {
        ctx.set_color(0, 0, ColorStyle::fg("red").with_bg("black"), 2);
        Rendered::text(rows(&["##"]))
    });
    let root = Component::new("root", move |ctx, _: &()| {
        Rendered::text(rows(&["....", "...."]))
            .with_colors(vec![ctx.colorize(&ColorSpan::between(0, 0, 1).fg("blue"))])
            .with_children(vec![ctx.child(ChildSpec::new(&cell, ()).bounds(2, 1, 2, 1))])
    });

    let surface = BufferSurface::with_grid(4, 2);
    let clock = ManualClock::new();
    let _handle = mount(&surface, &clock, &root, ());

    assert_eq!(
        surface.last_frame(),
        Some(rows(&[
            r#"<span class="literal-fg-blue">..</span>.."#,
            r#"..<span class="literal-fg-red literal-bg-black">##</span>"#,
        ]))
    );
}

#[test]
fn reactive_children_recompose_without_rerendering() {
    let items = writable(vec!['x']);
    let root_renders = Rc::new(Cell::new(0));

    let glyph = Component::new("glyph", |_, c: &char| Rendered::text(vec![c.to_string()]));
    let renders = root_renders.clone();
    let list = items.clone();
    let root = Component::new("root", move |ctx, _: &()| {
        renders.set(renders.get() + 1);
        let ctx = ctx.clone();
        let glyph = glyph.clone();
        let children = derived(&list, move |items: &Vec<char>| {
            items
                .iter()
                .enumerate()
                .map(|(x, c)| {
                    ctx.child(
                        ChildSpec::new(&glyph, *c)
                            .key(format!("{x}"))
                            .at(Point::new(x as i32, 0)),
                    )
                })
                .collect::<Vec<_>>()
        });
        Rendered::text(rows(&["---"])).with_children(children)
    });

    let surface = BufferSurface::with_grid(3, 1);
    let clock = ManualClock::new();
    let handle = mount(&surface, &clock, &root, ());
    assert_eq!(surface.last_frame(), Some(rows(&["x--"])));

    items.set(vec!['a', 'b', 'c']);
    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Recompose));
    assert_eq!(surface.last_frame(), Some(rows(&["abc"])));
    assert_eq!(root_renders.get(), 1);
}

#[derive(Default, Clone)]
struct RecordingInput {
    attached: Rc<Cell<usize>>,
    focused: Rc<Cell<usize>>,
    cleaned: Rc<Cell<usize>>,
}

struct RecordingWidget {
    input: RecordingInput,
}

impl InputCapture for RecordingInput {
    fn attach(&self, store: Writable<String>) -> Box<dyn InputWidget> {
        self.attached.set(self.attached.get() + 1);
        store.set(String::from("typed"));
        Box::new(RecordingWidget {
            input: self.clone(),
        })
    }
}

impl InputWidget for RecordingWidget {
    fn focus(&self) {
        self.input.focused.set(self.input.focused.get() + 1);
    }

    fn cleanup(&self) {
        self.input.cleaned.set(self.input.cleaned.get() + 1);
    }
}

#[test]
fn input_widgets_are_created_once_per_store() {
    let input = RecordingInput::default();

    let prompt = Component::new("prompt", |ctx, _: &()| {
        let value = ctx.use_named_store("value", String::new());
        let handle = ctx.use_input(&value);
        assert!(handle.is_bound());
        handle.focus();
        Rendered::text(vec![format!("{:<5}", value.get())])
    });

    let surface = BufferSurface::with_grid(5, 1);
    let clock = ManualClock::new();
    let options = MountOptions::new(surface.clone())
        .clock(clock.clone())
        .input_capture(input.clone());
    let handle = match Literal::new(options) {
        Ok(literal) => literal.mount(&prompt, ()),
        Err(err) => panic!("mount failed: {err}"),
    };

    // The widget wrote into the store during the first render.
    assert_eq!(handle.tick(), FrameOutcome::Presented(PassKind::Full));
    assert_eq!(surface.last_frame(), Some(rows(&["typed"])));
    assert_eq!(input.attached.get(), 1);
    assert_eq!(input.focused.get(), 2);

    handle.unmount();
    assert_eq!(input.cleaned.get(), 1);
}

#[test]
fn dev_mode_mounts_normally() {
    let root = Component::new("root", |_, _: &()| Rendered::text(rows(&["ok"])));
    let surface = BufferSurface::with_grid(2, 1);
    let options = MountOptions::new(surface.clone()).dev(true);
    let handle = Literal::new(options).map(|literal| literal.mount(&root, ()));
    assert!(handle.is_ok());
    assert_eq!(surface.last_frame(), Some(rows(&["ok"])));
}

#[test]
fn configuration_errors_are_reported() {
    assert!(matches!(
        Literal::new(MountOptions::empty()),
        Err(Error::MissingTarget)
    ));

    let partial = Palette::from_json(r#"{"defaultFG": "white"}"#);
    assert!(matches!(partial, Err(Error::MissingPaletteSlot("defaultBG"))));

    let malformed = Palette::from_json("{");
    assert!(matches!(malformed, Err(Error::PaletteFormat(_))));
}
