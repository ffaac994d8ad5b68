//! Object Lifecycle Tests
//!
//! Deleting objects from scripts: `DELETE` delivery, callback purging and
//! expired handles.

use appsys_core::{register_rhai_api, Bridge, BridgeConfig, BridgeRef, Handle};
use rhai::{Engine, Scope, INT};

fn setup() -> (Engine, BridgeRef) {
    let bridge = Bridge::shared(BridgeConfig::default());
    let mut engine = Engine::new();
    register_rhai_api(&mut engine, &bridge);
    (engine, bridge)
}

#[test]
fn delete_purges_every_code_of_the_object() {
    let (engine, bridge) = setup();
    let mut scope = Scope::new();
    engine
        .run_with_scope(
            &mut scope,
            r#"
let deleted = 0;
let btn = lv_btn_create(lv_scr_act());
register_event_handler(btn, 10, |e| 0);
register_event_handler(btn, 11, |e| 0);
register_event_handler(btn, lvgl_enum::LV_EVENT_ALL, |e| 0);
register_event_handler(btn, lvgl_enum::LV_EVENT_DELETE, |e| {
    // The object is still readable while DELETE runs.
    lv_obj_get_width(lv_event_get_target(e));
    deleted += 1;
});
lv_obj_del(btn);
"#,
        )
        .unwrap();

    assert_eq!(scope.get_value::<INT>("deleted"), Some(1));
    assert!(bridge.borrow().registry.is_empty());
}

#[test]
fn stale_handle_is_rejected_after_delete() {
    let (engine, bridge) = setup();
    let mut scope = Scope::new();
    engine
        .run_with_scope(
            &mut scope,
            r#"
let btn = lv_btn_create(lv_scr_act());
lv_obj_del(btn);
let replacement = lv_btn_create(lv_scr_act());
"#,
        )
        .unwrap();

    // The freed slot is reused with a new generation.
    let btn = scope.get_value::<Handle>("btn").unwrap();
    let replacement = scope.get_value::<Handle>("replacement").unwrap();
    assert_ne!(btn, replacement);
    assert_eq!(btn.raw() & 0xffff_ffff, replacement.raw() & 0xffff_ffff);

    for call in [
        "lv_obj_set_pos(btn, 1, 2);",
        "register_event_handler(btn, 10, |e| 0);",
        "lv_obj_send_event(btn, 10);",
        "lv_obj_del(btn);",
    ] {
        let err = engine.run_with_scope(&mut scope, call).unwrap_err();
        assert!(err.to_string().contains("expired handle"), "{call}: {err}");
    }
    assert!(bridge.borrow().registry.is_empty());

    // Unregistering from a deleted object is a no-op.
    engine
        .run_with_scope(&mut scope, "unregister_event_handler(btn, 10);")
        .unwrap();
}

#[test]
fn deleting_a_parent_purges_its_descendants() {
    let (engine, bridge) = setup();
    let script = r#"
let order = [];
let panel = lv_obj_create(lv_scr_act());
let btn = lv_btn_create(panel);
let label = lv_label_create(btn);
register_event_handler(panel, 10, |e| 0);
register_event_handler(btn, 10, |e| 0);
register_event_handler(label, lvgl_enum::LV_EVENT_DELETE, |e| order.push("label"));
register_event_handler(btn, lvgl_enum::LV_EVENT_DELETE, |e| order.push("btn"));
register_event_handler(panel, lvgl_enum::LV_EVENT_DELETE, |e| order.push("panel"));
lv_obj_del(panel);
order
"#;
    let order: Vec<String> = engine
        .eval::<rhai::Array>(script)
        .unwrap()
        .into_iter()
        .map(|v| v.into_string().unwrap())
        .collect();
    assert_eq!(order, ["label", "btn", "panel"]);
    assert!(bridge.borrow().registry.is_empty());
}

#[test]
fn clean_removes_children_only() {
    let (engine, bridge) = setup();
    let script = r#"
let panel = lv_obj_create(lv_scr_act());
let a = lv_btn_create(panel);
let b = lv_label_create(panel);
register_event_handler(panel, 10, |e| 0);
register_event_handler(a, 10, |e| 0);
register_event_handler(b, 10, |e| 0);
lv_obj_clean(panel);
lv_obj_get_child_cnt(panel)
"#;
    assert_eq!(engine.eval::<INT>(script).unwrap(), 0);
    assert_eq!(bridge.borrow().registry.len(), 1);
}

#[test]
fn deleting_inside_a_delete_callback_is_safe() {
    let (engine, bridge) = setup();
    let script = r#"
let panel = lv_obj_create(lv_scr_act());
let btn = lv_btn_create(panel);
let other = lv_btn_create(lv_scr_act());
register_event_handler(btn, lvgl_enum::LV_EVENT_DELETE, |e| {
    lv_obj_del(panel);
    lv_obj_del(other);
});
register_event_handler(other, 10, |e| 0);
lv_obj_del(panel);
lv_obj_get_child_cnt(lv_scr_act())
"#;
    assert_eq!(engine.eval::<INT>(script).unwrap(), 0);
    assert!(bridge.borrow().registry.is_empty());
}

#[test]
fn delete_callback_cannot_create_under_the_dying_parent() {
    let (engine, bridge) = setup();
    let screens = bridge.borrow().tree.len();
    let script = r#"
let errors = [];
let panel = lv_obj_create(lv_scr_act());
let btn = lv_btn_create(panel);
register_event_handler(btn, lvgl_enum::LV_EVENT_DELETE, |e| {
    try {
        let late = lv_btn_create(panel);
        register_event_handler(late, 10, |e| 0);
    } catch (err) {
        errors.push(`${err}`);
    }
});
lv_obj_del(panel);
errors
"#;
    let errors = engine.eval::<rhai::Array>(script).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("expired handle"), "{}", errors[0]);

    // Nothing created during the delete outlives it.
    assert!(bridge.borrow().registry.is_empty());
    assert_eq!(bridge.borrow().tree.len(), screens);
}

/// Objects on additional screens are purged too.
#[test]
fn secondary_screens_are_observed() {
    let (engine, bridge) = setup();
    let script = r#"
let screen = lv_obj_create(());
let btn = lv_btn_create(screen);
register_event_handler(btn, 10, |e| 0);
lv_obj_del(btn);
register_event_handler(screen, 10, |e| 0);
lv_obj_del(screen);
"#;
    engine.run(script).unwrap();
    assert!(bridge.borrow().registry.is_empty());
}

#[test]
fn deleting_the_active_screen_installs_a_fresh_one() {
    let (engine, bridge) = setup();
    let script = r#"
let old = lv_scr_act();
register_event_handler(old, 10, |e| 0);
lv_obj_del(old);
let fresh = lv_scr_act();
let btn = lv_btn_create(fresh);
register_event_handler(btn, 10, |e| 0);
lv_obj_del(btn);
fresh != old
"#;
    assert!(engine.eval::<bool>(script).unwrap());
    assert!(bridge.borrow().registry.is_empty());
}

#[test]
fn msgbox_close_deletes_it() {
    let (engine, bridge) = setup();
    let script = r#"
let mbox = lv_msgbox_create(lv_scr_act());
let closed = false;
register_event_handler(mbox, lvgl_enum::LV_EVENT_DELETE, |e| { closed = true; });
lv_msgbox_close(mbox);
closed
"#;
    assert!(engine.eval::<bool>(script).unwrap());
    assert!(bridge.borrow().registry.is_empty());
}
