//! App Runner Tests
//!
//! Running packages end to end with host-driven input.

use appsys_core::{AppError, AppPackage, AppRuntime, AppSystem, BridgeConfig, Handle};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const COUNTER_APP: &str = r#"
let clicks = 0;
let screen = lv_scr_act();
let btn = lv_btn_create(screen);
let label = lv_label_create(btn);
lv_label_set_text(label, "0");
lv_obj_center(btn);

register_event_handler(btn, lvgl_enum::LV_EVENT_CLICKED, |e| {
    clicks += 1;
    lv_label_set_text(label, `${clicks}`);
});
"#;

#[test]
fn clicks_reach_script_callbacks() {
    init_tracing();
    let mut runtime = AppRuntime::new(BridgeConfig::default());
    runtime
        .run(&AppPackage::from_script("counter", COUNTER_APP))
        .unwrap();

    let btn = runtime.variable::<Handle>("btn").unwrap();
    runtime.click(&btn).unwrap();
    runtime.click(&btn).unwrap();
    let report = runtime.pump_until_idle().unwrap();

    assert_eq!(report.invoked, 2);
    assert_eq!(report.failed, 0);

    // The label text is what the callbacks wrote.
    let label = runtime.variable::<Handle>("label").unwrap().as_object().unwrap();
    let text = runtime.bridge().borrow().tree.get(label).unwrap().text.clone();
    assert_eq!(text.unwrap().to_str().unwrap(), "2");
}

#[test]
fn pump_delivers_clicks_and_fired_codes() {
    let script = r#"
let seen = [];
let a = lv_btn_create(lv_scr_act());
let b = lv_btn_create(lv_scr_act());
register_event_handler(a, 10, |e| seen.push("a"));
register_event_handler(b, lvgl_enum::LV_EVENT_ALL, |e| seen.push(e.code));
"#;
    let mut runtime = AppRuntime::new(BridgeConfig::default());
    runtime.run(&AppPackage::from_script("rounds", script)).unwrap();

    let a = runtime.variable::<Handle>("a").unwrap();
    let b = runtime.variable::<Handle>("b").unwrap();
    runtime.click(&a).unwrap();
    runtime.fire(&b, appsys_core::widgets::EventCode::VALUE_CHANGED).unwrap();

    let report = runtime.pump().unwrap();
    assert_eq!(report.invoked, 2);
    assert!(!runtime.has_pending());
}

#[test]
fn callback_failures_are_counted() {
    init_tracing();
    let script = r#"
let btn = lv_btn_create(lv_scr_act());
register_event_handler(btn, 10, |e| { throw "broken"; });
"#;
    let mut runtime = AppRuntime::new(BridgeConfig::default());
    runtime.run(&AppPackage::from_script("broken", script)).unwrap();
    let btn = runtime.variable::<Handle>("btn").unwrap();
    runtime.click(&btn).unwrap();

    let report = runtime.pump_until_idle().unwrap();
    assert_eq!((report.invoked, report.failed), (1, 1));
}

#[test]
fn result_codes_match_outcomes() {
    let mut runtime = AppRuntime::new(BridgeConfig::default());
    let cases = [
        ("", -1),
        ("let x = ;", -2),
        ("lv_obj_set_pos(lv_scr_act(), 1);", -3),
    ];
    for (script, code) in cases {
        let err: AppError = runtime
            .run(&AppPackage::from_script("case", script))
            .unwrap_err();
        assert_eq!(err.code(), code, "{script}: {err}");
    }
}

#[test]
fn shutdown_releases_callbacks_and_is_idempotent() {
    let mut runtime = AppRuntime::new(BridgeConfig::default());
    runtime
        .run(&AppPackage::from_script("counter", COUNTER_APP))
        .unwrap();
    let bridge = runtime.bridge().clone();

    assert_eq!(runtime.shutdown(), 1);
    assert_eq!(runtime.shutdown(), 0);
    assert!(bridge.borrow().registry.is_empty());

    // Nothing is delivered after shutdown.
    let btn = bridge.borrow().tree.root();
    bridge.borrow_mut().tree.simulate_click(btn).unwrap();
    assert_eq!(runtime.pump().unwrap().invoked, 0);
}

#[test]
fn app_system_runs_one_app_at_a_time() {
    let mut system = AppSystem::new(BridgeConfig::default());
    let first = system
        .run_app(&AppPackage::from_script("counter", COUNTER_APP))
        .unwrap()
        .bridge()
        .clone();

    let err = system
        .run_app(&AppPackage::from_script("broken", "throw 1;"))
        .unwrap_err();
    assert!(matches!(err, AppError::ScriptException(_)));
    assert!(first.borrow().registry.is_empty());
    assert!(system.current().is_none());

    let info = r#"let id = app_info.app_id;"#;
    let runtime = system
        .run_app(&AppPackage::from_script("com.example.info", info))
        .unwrap();
    assert_eq!(runtime.variable::<String>("id").unwrap(), "com.example.info");
}
