//! Handle lifecycle: construction, mutation guards, parent/child, finalize.

use trellis_toolkit::WidgetId;
use trellis_ui::App;

fn widget_of(app: &App, uid: &str) -> WidgetId {
    let bridge = app.bridge().borrow();
    let key = bridge.find_by_uid(uid).expect("component not found");
    bridge.components().get(key).unwrap().widget()
}

fn screen_children(app: &App) -> usize {
    let bridge = app.bridge().borrow();
    let root = bridge.toolkit().root();
    bridge.toolkit().children(root).len()
}

#[test]
fn test_construct_creates_live_widget_with_back_reference() {
    let app = App::new().unwrap();

    app.lua()
        .load(r#"_G.s1 = trellis.Switch({ uid = "s1" })"#)
        .exec()
        .unwrap();

    let widget = widget_of(&app, "s1");
    let bridge = app.bridge().borrow();
    assert!(bridge.toolkit().is_valid(widget));
    assert!(bridge.toolkit().user_data(widget).is_some());
    assert_eq!(bridge.toolkit().parent(widget), Some(bridge.toolkit().root()));
}

#[test]
fn test_constructor_exposes_uid_and_kind() {
    let app = App::new().unwrap();

    let (uid, kind): (String, String) = app
        .lua()
        .load(
            r#"
            local s = trellis.Switch({ uid = "s1" })
            _G.s = s
            return s.uid, s.kind
        "#,
        )
        .eval()
        .unwrap();

    assert_eq!(uid, "s1");
    assert_eq!(kind, "Switch");
}

#[test]
fn test_missing_uid_is_configuration_error() {
    let app = App::new().unwrap();

    let err = app
        .lua()
        .load(r#"trellis.Switch({})"#)
        .exec()
        .unwrap_err();
    assert!(err.to_string().contains("uid must be a string"));
}

#[test]
fn test_non_string_uid_is_configuration_error() {
    let app = App::new().unwrap();

    let err = app
        .lua()
        .load(r#"trellis.Switch({ uid = 42 })"#)
        .exec()
        .unwrap_err();
    assert!(err.to_string().contains("uid must be a string"));
    assert_eq!(screen_children(&app), 0);
}

#[test]
fn test_construct_under_parent() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            _G.s1 = trellis.Switch({ uid = "s1" })
            _G.s2 = trellis.Switch({ uid = "s2" }, _G.s1)
        "#,
        )
        .exec()
        .unwrap();

    let parent = widget_of(&app, "s1");
    let child = widget_of(&app, "s2");
    assert_eq!(app.bridge().borrow().toolkit().parent(child), Some(parent));
}

#[test]
fn test_append_and_remove_child_through_script() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            _G.s1 = trellis.Switch({ uid = "s1" })
            _G.s2 = trellis.Switch({ uid = "s2" })
            _G.s1:append_child(_G.s2)
        "#,
        )
        .exec()
        .unwrap();

    let parent = widget_of(&app, "s1");
    let child = widget_of(&app, "s2");
    assert_eq!(app.bridge().borrow().toolkit().parent(child), Some(parent));

    app.lua()
        .load(r#"_G.s1:remove_child(_G.s2)"#)
        .exec()
        .unwrap();

    let bridge = app.bridge().borrow();
    assert_eq!(bridge.toolkit().parent(child), Some(bridge.toolkit().root()));
    assert!(bridge.toolkit().children(parent).is_empty());
}

#[test]
fn test_append_child_rejects_foreign_values() {
    let app = App::new().unwrap();

    let err: String = app
        .lua()
        .load(
            r#"
            _G.s1 = trellis.Switch({ uid = "s1" })
            local ok, err = pcall(function() _G.s1:append_child(42) end)
            assert(not ok)
            return tostring(err)
        "#,
        )
        .eval()
        .unwrap();
    assert!(err.contains("expected a wrapped component"));
}

#[test]
fn test_mutation_after_destroy_is_use_after_free() {
    let app = App::new().unwrap();

    let err: String = app
        .lua()
        .load(
            r#"
            local s = trellis.Switch({ uid = "s1" })
            s:destroy()
            local ok, err = pcall(function() s:set_style({ width = 10 }) end)
            assert(not ok)
            return tostring(err)
        "#,
        )
        .eval()
        .unwrap();

    assert!(err.contains("operation on finalized handle"));
    // The failed call must not have touched the toolkit.
    assert_eq!(screen_children(&app), 0);
}

#[test]
fn test_double_destroy_is_noop() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            local s = trellis.Switch({ uid = "s1" })
            s:destroy()
            s:destroy()
        "#,
        )
        .exec()
        .unwrap();

    assert_eq!(screen_children(&app), 0);
}

#[test]
fn test_gc_finalizes_unreachable_handle() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            do
                local s = trellis.Switch({ uid = "s1" })
            end
        "#,
        )
        .exec()
        .unwrap();
    assert_eq!(screen_children(&app), 1);

    app.lua().gc_collect().unwrap();
    app.lua().gc_collect().unwrap();

    assert_eq!(screen_children(&app), 0);
    assert!(app.bridge().borrow().components().is_empty());
}

#[test]
fn test_destroy_then_gc_does_not_double_free() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            do
                local s = trellis.Switch({ uid = "s1" })
                s:destroy()
            end
        "#,
        )
        .exec()
        .unwrap();

    app.lua().gc_collect().unwrap();
    app.lua().gc_collect().unwrap();

    assert_eq!(screen_children(&app), 0);
}

#[test]
fn test_finalized_parent_leaves_child_handle_valid_but_widget_dead() -> anyhow::Result<()> {
    let app = App::new()?;

    app.lua()
        .load(
            r#"
            _G.s2 = trellis.Switch({ uid = "s2" })
            do
                local s1 = trellis.Switch({ uid = "s1" })
                s1:append_child(_G.s2)
                s1:destroy()
            end
        "#,
        )
        .exec()?;

    // s2's handle is still script-reachable, but its widget went down with s1.
    let (uid, err): (String, String) = app
        .lua()
        .load(
            r#"
            local ok, err = pcall(function() _G.s2:set_style({ width = 10 }) end)
            assert(not ok)
            return _G.s2.uid, tostring(err)
        "#,
        )
        .eval()?;

    assert_eq!(uid, "s2");
    assert!(err.contains("native widget no longer exists"));

    // Finalizing s2 afterwards must not crash on the already-dead widget.
    app.lua().load(r#"_G.s2:destroy()"#).exec()?;
    assert!(app.bridge().borrow().components().is_empty());
    Ok(())
}

#[test]
fn test_checked_state_through_script() {
    let app = App::new().unwrap();

    let (before, after): (bool, bool) = app
        .lua()
        .load(
            r#"
            _G.s = trellis.Switch({ uid = "s1" })
            local before = _G.s:checked()
            _G.s:set_checked(true)
            return before, _G.s:checked()
        "#,
        )
        .eval()
        .unwrap();

    assert!(!before);
    assert!(after);
}

#[test]
fn test_align_and_align_to() {
    let app = App::new().unwrap();

    app.lua()
        .load(
            r#"
            _G.s1 = trellis.Switch({ uid = "s1" })
            _G.s2 = trellis.Switch({ uid = "s2" })
            _G.s1:align({ align = "center" })
            _G.s2:align_to(_G.s1, { align = "out_bottom_mid", y = 8 })
        "#,
        )
        .exec()
        .unwrap();

    let err: String = app
        .lua()
        .load(
            r#"
            local ok, err = pcall(function() _G.s1:align({ align = "sideways" }) end)
            assert(not ok)
            return tostring(err)
        "#,
        )
        .eval()
        .unwrap();
    assert!(err.contains("unknown alignment"));
}
