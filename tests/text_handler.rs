mod common;

use common::{contents, plain_opts, stamp, take, FailingSink};
use slogfmt::buffer::{self, MAX_POOLED_CAPACITY};
use slogfmt::color::ColorChoice;
use slogfmt::{Attr, Error, Handler, HandlerOptions, Level, Record, TextHandler, Value};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn colorized_record_layout() {
    let h = TextHandler::new(
        Vec::new(),
        HandlerOptions::default().with_color(ColorChoice::Always),
    );
    h.handle(
        &Record::new(Level::INFO, "hello")
            .with_time(stamp())
            .with_attr(Attr::string("k", "v")),
    )
    .unwrap();
    assert_eq!(
        contents(h.sink()),
        concat!(
            "\x1b[35m2024-01-02\x1b[0m \x1b[34m03:04:05\x1b[0m ",
            "\x1b[90m|\x1b[0m  \x1b[1;92mINFO\x1b[0m \x1b[90m|\x1b[0m ",
            "\x1b[97mhello \x1b[0m",
            "\x1b[90mk=\"v\" \x1b[0m\n",
        )
    );
}

#[test]
fn empty_record_has_no_attribute_block() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::ERROR, "").with_time(stamp()))
        .unwrap();
    assert_eq!(contents(h.sink()), "2024-01-02 03:04:05 | ERROR |  \n");
}

#[test]
fn two_line_message_gets_continuation_marker() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "a\nb")).unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | a↲\n  │ > b\n\n");
}

#[test]
fn group_attribute_inlines_dotted_key() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "m").with_attr(Attr::group("g", vec![Attr::int("x", 1)])))
        .unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | m g.x=1 \n");
}

#[test]
fn empty_attributes_vanish_at_every_depth() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    let record = Record::new(Level::INFO, "m").with_attrs([
        Attr::empty(),
        Attr::group("g", vec![Attr::empty(), Attr::int("x", 1), Attr::group("e", vec![])]),
        Attr::group("", vec![Attr::empty()]),
        Attr::lazy("", || Value::Empty),
    ]);
    h.handle(&record).unwrap();
    let first = take(h.sink());
    h.handle(&record).unwrap();
    let second = take(h.sink());
    assert_eq!(first, "|  INFO | m g.x=1 \n");
    assert_eq!(first, second);
}

#[test]
fn duplicate_keys_are_all_emitted() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "m").with_attrs([Attr::int("k", 1), Attr::int("k", 2)]))
        .unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | m k=1 k=2 \n");
}

#[test]
fn scalar_kinds_render() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "m").with_attrs([
        Attr::time("at", stamp()),
        Attr::duration("took", Duration::from_millis(1500)),
        Attr::float("ratio", 0.25),
        Attr::uint("n", 3),
        Attr::any("who", "bob"),
        Attr::string("q", "say \"hi\""),
    ]))
    .unwrap();
    assert_eq!(
        contents(h.sink()),
        "|  INFO | m at=2024-01-02T03:04:05Z took=1.5s ratio=0.25 n=3 who=bob q=\"say \\\"hi\\\"\" \n"
    );
}

#[test]
fn lazy_values_resolve_before_rendering() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "m").with_attr(Attr::lazy("g", || {
        Value::Group(vec![Attr::int("x", 1)])
    })))
    .unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | m g.x=1 \n");
}

#[test]
fn rewrite_hook_replaces_and_suppresses() {
    let h = TextHandler::new(
        Vec::new(),
        plain_opts().with_replace_attr(|groups, a| {
            if a.key == "password" {
                None
            } else if a.key == "user" && groups == ["req"] {
                Some(Attr::string("user", "***"))
            } else {
                Some(a)
            }
        }),
    );
    h.handle(&Record::new(Level::INFO, "login").with_attrs([
        Attr::string("password", "hunter2"),
        Attr::string("user", "top"),
        Attr::group("req", vec![Attr::string("user", "bob"), Attr::string("password", "x")]),
    ]))
    .unwrap();
    assert_eq!(
        contents(h.sink()),
        "|  INFO | login user=\"top\" req.user=\"***\" \n"
    );
}

#[test]
fn hook_returning_group_is_rendered_as_group() {
    let h = TextHandler::new(
        Vec::new(),
        plain_opts().with_replace_attr(|_, a| {
            if a.key == "point" {
                Some(Attr::group("point", vec![Attr::int("x", 1), Attr::int("y", 2)]))
            } else {
                Some(a)
            }
        }),
    );
    h.handle(&Record::new(Level::INFO, "m").with_attr(Attr::string("point", "1,2")))
        .unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | m point.x=1 point.y=2 \n");
}

#[test]
fn threshold_consumes_configured_level() {
    let h = TextHandler::new(Vec::new(), plain_opts().with_level(Level::WARN));
    assert!(!h.enabled(Level::INFO));
    assert!(h.enabled(Level::ERROR));
    assert_eq!(h.options().level, Level::WARN);
}

#[test]
fn write_failure_is_returned() {
    let h = TextHandler::new(FailingSink, plain_opts());
    let err = h.handle(&Record::new(Level::INFO, "m")).unwrap_err();
    assert!(matches!(err, Error::Write(_)));
}

#[test]
fn oversized_render_buffer_is_not_pooled() {
    let h = TextHandler::new(std::io::sink(), plain_opts());
    let big = "x".repeat(MAX_POOLED_CAPACITY * 2);
    h.handle(&Record::new(Level::INFO, big)).unwrap();
    let b = buffer::get();
    assert!(b.capacity() <= MAX_POOLED_CAPACITY);
}

#[test]
fn shared_attr_values_are_cheap_to_clone() {
    let value = Value::Any(Arc::new(42u32));
    let a = Attr::new("n", value.clone());
    assert_eq!(a.value.to_string(), value.to_string());
}

#[test]
fn extreme_levels_never_overflow() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    assert!(h.enabled(Level::new(1_000_000_000)));
    assert!(!h.enabled(Level::new(i32::MIN)));
    h.handle(&Record::new(Level::new(i32::MIN), "lo")).unwrap();
    h.handle(&Record::new(Level::new(i32::MAX), "hi")).unwrap();
    assert_eq!(
        contents(h.sink()),
        "| TRACE-2147483648 | lo \n| FATAL+2147483641 | hi \n"
    );
}

#[test]
fn escape_sequences_in_values_are_neutralized() {
    let h = TextHandler::new(Vec::new(), plain_opts());
    h.handle(&Record::new(Level::INFO, "m").with_attr(Attr::string("k", "\x1b[31m\0")))
        .unwrap();
    assert_eq!(contents(h.sink()), "|  INFO | m k=\"\\x1b[31m\\x00\" \n");
}
