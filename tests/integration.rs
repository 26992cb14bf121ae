//! Integration tests for webloom.
//!
//! These tests exercise the public API from outside the crate: pilots play
//! the browser's role, widgets are constructed over real transports, and
//! every assertion goes through registered endpoints or bus messages.

use serde_json::{json, Map, Value};

use webloom::options::{OptionKey, OptionValue};
use webloom::testing::{PollingPilot, PushPilot};
use webloom::value::FilePart;
use webloom::widgets::grid::GRID_CSS_URL;
use webloom::widgets::*;
use webloom::{Element, Page, Render, WidgetHandle, WidgetOptions};

// ---------------------------------------------------------------------------
// Button lifecycle over polling
// ---------------------------------------------------------------------------

#[test]
fn button_click_delivers_snapshot_to_callback() {
    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    btn.on_click(|source, props| {
        assert_eq!(source, "b");
        assert_eq!(props.get_str("title"), Some("Push"));
        assert_eq!(props.get_bool("disabled"), Some(false));
        Ok(json!("ok"))
    });

    let resp = pilot.fire(&btn, "click", [("title", "Push"), ("disabled", "false")]);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_json().unwrap(), json!({"result": "ok"}));
}

#[test]
fn set_title_shows_up_on_next_poll() {
    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    btn.set_title("Stop");
    let props = pilot.sync(&btn);
    assert_eq!(props["title"], json!("Stop"));
}

#[test]
fn callback_failure_surfaces_as_server_error() {
    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    btn.on_click(|_, _| Err("not allowed".into()));
    let resp = pilot.fire(&btn, "click", std::iter::empty());
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body_json().unwrap(), json!({"message": "not allowed"}));
}

#[test]
fn event_without_callback_returns_null_result() {
    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    let resp = pilot.fire(&btn, "click", [("title", "Renamed")]);
    assert_eq!(resp.body_json().unwrap(), json!({"result": null}));
    // State writes happened even though no callback ran.
    assert_eq!(btn.title(), "Renamed");
}

#[test]
fn constructing_twice_registers_endpoints_once() {
    let pilot = PollingPilot::new();
    let _first = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    let routes_after_first = pilot.host().len();
    let _second = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    assert_eq!(pilot.host().len(), routes_after_first);
}

// ---------------------------------------------------------------------------
// CheckBox toggle
// ---------------------------------------------------------------------------

#[test]
fn checkbox_toggle_round_trip() {
    let pilot = PollingPilot::new();
    let opts = WidgetOptions::new().with(OptionKey::Value, OptionValue::Text("agree".into()));
    let cb = CheckBox::new("c", "Accept", pilot.transport(), &opts).unwrap();
    // The callback always sees the full snapshot, not just the toggle.
    cb.on_click(|_, props| {
        assert_eq!(props.get_str("title"), Some("Accept"));
        assert_eq!(props.get_str("value"), Some("agree"));
        assert_eq!(props.get_bool("disabled"), Some(false));
        Ok(json!(props.get_bool("checked")))
    });

    let resp = pilot.fire(&cb, "click", [("checked", "true")]);
    assert_eq!(resp.body_json().unwrap(), json!({"result": true}));
    assert!(cb.is_checked());
    let synced = pilot.sync(&cb);
    assert_eq!(synced["checked"], json!(true));
    assert_eq!(synced["value"], json!("agree"));

    pilot.fire(&cb, "click", [("checked", "false")]);
    assert!(!cb.is_checked());
}

// ---------------------------------------------------------------------------
// Grid commands and record ids
// ---------------------------------------------------------------------------

fn record(name: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".into(), json!(name));
    map
}

#[test]
fn grid_assigns_recids_and_streams_commands() {
    let pilot = PollingPilot::new();
    let grid = Grid::new(
        "g",
        vec![Column::new("name", "Name", "100%")],
        pilot.transport(),
        &WidgetOptions::new(),
    )
    .unwrap();

    assert_eq!(grid.add_record(record("Ada")), 1);
    assert_eq!(grid.add_record(record("Grace")), 2);

    // One command per poll, oldest first, carried on the sync payload.
    let first = pilot.sync(&grid);
    assert_eq!(first["cmd"], json!("ADD-RECORD"));
    assert_eq!(first["arg0"]["recid"], json!(1));
    assert_eq!(first["total"], json!(2));

    let second = pilot.sync(&grid);
    assert_eq!(second["arg0"]["recid"], json!(2));

    // Drained afterwards; the payload reverts to plain observable state.
    assert!(pilot.sync(&grid).get("cmd").is_none());
}

#[test]
fn grid_row_click_selects_record() {
    let pilot = PollingPilot::new();
    let grid = Grid::new(
        "g",
        vec![Column::new("name", "Name", "100%")],
        pilot.transport(),
        &WidgetOptions::new(),
    )
    .unwrap();
    grid.add_record(record("Ada"));
    pilot.fire(&grid, "click", [("recid", "1")]);
    assert_eq!(grid.selected(), vec![1]);
}

// ---------------------------------------------------------------------------
// File upload filtering
// ---------------------------------------------------------------------------

#[test]
fn upload_stores_allowed_file_and_enriches_props() {
    let pilot = PollingPilot::new();
    let dir = tempfile::tempdir().unwrap();
    let up = FileUpload::new("f", dir.path(), pilot.transport(), &WidgetOptions::new()).unwrap();
    up.on_upload(|_, props| Ok(json!(props.get_str("filename"))));

    let resp = pilot.upload(&up, "change", FilePart::new("report.pdf", b"%PDF".to_vec()));
    assert_eq!(resp.body_json().unwrap(), json!({"result": "report.pdf"}));
    assert!(dir.path().join("report.pdf").exists());
}

#[test]
fn upload_drops_disallowed_extension_but_still_fires() {
    let pilot = PollingPilot::new();
    let dir = tempfile::tempdir().unwrap();
    let up = FileUpload::new("f", dir.path(), pilot.transport(), &WidgetOptions::new()).unwrap();
    up.on_upload(|_, props| {
        assert!(!props.contains("filename"));
        Ok(json!("fired"))
    });

    let resp = pilot.upload(&up, "change", FilePart::new("evil.exe", b"MZ".to_vec()));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_json().unwrap(), json!({"result": "fired"}));
    assert!(!dir.path().join("evil.exe").exists());
}

// ---------------------------------------------------------------------------
// Form submission
// ---------------------------------------------------------------------------

#[test]
fn form_submit_collects_all_fields() {
    let pilot = PollingPilot::new();
    let form = Form::new("f", pilot.transport(), &WidgetOptions::new()).unwrap();
    form.add_field(Element::new("input", "u").with_property("type", "text"))
        .unwrap();
    form.add_field(Element::new("input", "v").with_property("type", "text"))
        .unwrap();
    form.on_submit(|_, props| Ok(props.to_json()));

    let resp = pilot
        .host()
        .dispatch(
            &form.event_route("submit"),
            webloom::route::Method::Post,
            webloom::route::Request::with_query([("u", "1"), ("v", "2")]),
        )
        .unwrap();
    assert_eq!(
        resp.body_json().unwrap(),
        json!({"result": {"u": "1", "v": "2"}})
    );
    assert_eq!(form.submitted().get("u").map(String::as_str), Some("1"));
}

// ---------------------------------------------------------------------------
// Push transport end to end
// ---------------------------------------------------------------------------

#[test]
fn push_syncs_immediately_on_setter() {
    let pilot = PushPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    let mut rx = pilot.connect(&btn);

    btn.set_title("Live");
    let msg = rx.try_recv().unwrap();
    assert_eq!(msg.event, "sync_properties_b");
    assert_eq!(msg.payload["title"], json!("Live"));
}

#[test]
fn push_event_acks_success_after_sync() {
    let pilot = PushPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    btn.on_click(|_, props| Ok(json!(props.get_str("title"))));
    let mut rx = pilot.connect(&btn);

    pilot.emit(&btn, "click", json!({"title": "Go"}));
    let sync = rx.try_recv().unwrap();
    assert_eq!(sync.event, "sync_properties_b");
    let ack = rx.try_recv().unwrap();
    assert_eq!(ack.event, "success");
    assert_eq!(ack.payload, json!({"result": "Go"}));
}

#[test]
fn push_commands_skip_the_queue() {
    let pilot = PushPilot::new();
    let dlg = Dialog::new("d", "Confirm", pilot.transport(), &WidgetOptions::new()).unwrap();
    let mut rx = pilot.connect(&dlg);
    dlg.open();

    // Setter sync first, then the command-bearing sync.
    let _state = rx.try_recv().unwrap();
    let cmd = rx.try_recv().unwrap();
    assert_eq!(cmd.payload["cmd"], json!("OPEN"));
    assert!(dlg.channel().commands().is_empty());
}

#[test]
fn push_json_string_boolean_is_not_a_boolean() {
    let pilot = PushPilot::new();
    let cb = CheckBox::new("c", "Accept", pilot.transport(), &WidgetOptions::new()).unwrap();
    // A JSON string "true" must not toggle the box.
    pilot.emit(&cb, "click", json!({"checked": "true"}));
    assert!(!cb.is_checked());
    // A native boolean does.
    pilot.emit(&cb, "click", json!({"checked": true}));
    assert!(cb.is_checked());
}

// ---------------------------------------------------------------------------
// Page composition
// ---------------------------------------------------------------------------

#[test]
fn page_renders_widgets_and_dedups_includes() {
    let pilot = PollingPilot::new();
    let grid_a = Grid::new(
        "ga",
        vec![Column::new("n", "N", "100%")],
        pilot.transport(),
        &WidgetOptions::new(),
    )
    .unwrap();
    let grid_b = Grid::new(
        "gb",
        vec![Column::new("n", "N", "100%")],
        pilot.transport(),
        &WidgetOptions::new(),
    )
    .unwrap();

    let mut page = Page::new("Dashboard");
    page.add(grid_a);
    page.add(grid_b);
    let html = page.render();

    assert!(html.contains("<title>Dashboard</title>"));
    assert!(html.contains("<h1>Dashboard</h1>"));
    assert!(html.contains("id='ga'"));
    assert!(html.contains("id='gb'"));
    // Two grids, one stylesheet include.
    assert_eq!(html.matches(GRID_CSS_URL).count(), 1);
}

#[test]
fn layouts_nest_widgets_without_transports() {
    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &WidgetOptions::new()).unwrap();
    let tb = TextBox::new("t", "", pilot.transport(), &WidgetOptions::new()).unwrap();

    let mut layout = webloom::layout::SimpleGridLayout::new("l", 2).unwrap();
    layout.add(btn).add(tb);
    let html = layout.render();
    assert!(html.contains("<table id='l'"));
    assert!(html.find("id='b'").unwrap() < html.find("id='t'").unwrap());
}

// ---------------------------------------------------------------------------
// Options plumbing
// ---------------------------------------------------------------------------

#[test]
fn string_option_keys_resolve_and_reject() {
    let mut opts = WidgetOptions::new();
    opts.set("disabled", OptionValue::Flag(true)).unwrap();
    assert!(opts.set("no-such-option", OptionValue::Flag(true)).is_err());

    let pilot = PollingPilot::new();
    let btn = Button::new("b", "Push", pilot.transport(), &opts).unwrap();
    assert!(btn.is_disabled());
}

#[test]
fn widget_rejects_recognized_but_unsupported_option() {
    let pilot = PollingPilot::new();
    let opts = WidgetOptions::new().with(OptionKey::UploadFolder, OptionValue::Text("/tmp".into()));
    assert!(Button::new("b", "Push", pilot.transport(), &opts).is_err());
}

// ---------------------------------------------------------------------------
// Tree over polling
// ---------------------------------------------------------------------------

#[test]
fn tree_add_and_remove_streams_commands() {
    let pilot = PollingPilot::new();
    let tree = Tree::new("t", pilot.transport(), &WidgetOptions::new()).unwrap();
    let animals = tree.add_node(tree.root(), "Animals").unwrap();
    tree.add_node(animals, "Cat").unwrap();
    tree.remove_node(animals).unwrap();

    let cmds: Vec<String> = (0..3)
        .map(|_| pilot.sync(&tree)["cmd"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(cmds, vec!["ADD-NODE", "ADD-NODE", "REMOVE-NODE"]);
    assert_eq!(tree.node_count(), 0);
}
