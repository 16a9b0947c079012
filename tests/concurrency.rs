mod common;

use common::{plain_opts, Trickle};
use parking_lot::Mutex;
use slogfmt::{Attr, Handler, HandlerOptions, IndentHandler, Level, Record, TextHandler};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 4;
const PER_THREAD: usize = 50;

#[test]
fn sibling_handlers_never_interleave_lines() {
    let root = TextHandler::new(Trickle::default(), plain_opts());
    let handlers: Vec<_> = (0..THREADS)
        .map(|i| root.with_attrs(vec![Attr::uint("worker", i as u64)]))
        .collect();

    thread::scope(|s| {
        for h in &handlers {
            s.spawn(move || {
                for n in 0..PER_THREAD {
                    let record = Record::new(Level::INFO, "tick")
                        .with_attr(Attr::uint("n", n as u64));
                    h.handle(&record).unwrap();
                }
            });
        }
    });

    let out = String::from_utf8(root.sink().lock().0.clone()).expect("utf8 output");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    for line in lines {
        let rest = line
            .strip_prefix("|  INFO | tick worker=")
            .unwrap_or_else(|| panic!("torn line {:?}", line));
        let (worker, n) = rest
            .trim_end()
            .split_once(" n=")
            .unwrap_or_else(|| panic!("torn line {:?}", line));
        assert!(worker.parse::<usize>().unwrap() < THREADS);
        assert!(n.parse::<usize>().unwrap() < PER_THREAD);
    }
}

#[test]
fn separate_roots_can_share_one_lock() {
    let sink = Arc::new(Mutex::new(Trickle::default()));
    let text = TextHandler::with_shared_sink(Arc::clone(&sink), plain_opts());
    let block = IndentHandler::with_shared_sink(Arc::clone(&sink), HandlerOptions::default());

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..PER_THREAD {
                text.handle(&Record::new(Level::INFO, "flat")).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..PER_THREAD {
                block.handle(&Record::new(Level::WARN, "block")).unwrap();
            }
        });
    });

    let out = String::from_utf8(sink.lock().0.clone()).expect("utf8 output");
    let flat = out.matches("|  INFO | flat \n").count();
    let blocks = out.matches("level: WARN\nmsg: block\n---\n").count();
    assert_eq!(flat, PER_THREAD);
    assert_eq!(blocks, PER_THREAD);
}

#[test]
fn concurrent_first_use_of_paint_cache() {
    let root = TextHandler::new(
        Vec::new(),
        HandlerOptions::default().with_color(slogfmt::color::ColorChoice::Always),
    );
    thread::scope(|s| {
        for i in 0..THREADS {
            let h = root.with_group("g").with_attrs(vec![Attr::uint("i", i as u64)]);
            s.spawn(move || {
                h.handle(&Record::new(Level::new(-1 - i as i32), "x\ny")).unwrap();
            });
        }
    });
    let out = String::from_utf8(root.sink().lock().clone()).expect("utf8 output");
    assert_eq!(out.matches("\x1b[90m↲\x1b[0m").count(), THREADS);
}
