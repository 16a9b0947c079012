use std::time::Instant;

use slogfmt::{Attr, Handler, HandlerOptions, IndentHandler, Level, Record, TextHandler};

fn run<H: Handler>(name: &str, handler: &H, n: u64) {
    let start = Instant::now();

    for i in 0..n {
        let record = Record::now(Level::ERROR, "default load test error")
            .with_source(file!(), line!())
            .with_attr(Attr::uint("iteration", i))
            .with_attr(Attr::group("req", vec![Attr::string("path", "/login")]));
        if let Err(e) = handler.handle(&record) {
            eprintln!("{}: write failed: {}", name, e);
            return;
        }
    }

    let elapsed = start.elapsed();
    println!(
        "{}: rendered {} records in {:?} (~{:.0} rec/s)",
        name,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    let n: u64 = 100_000;
    let opts = HandlerOptions::default().with_source(true);

    let text = TextHandler::new(std::io::sink(), opts.clone())
        .with_attrs(vec![Attr::string("service", "auth")])
        .with_group("ctx");
    run("text", &text, n);

    let indent = IndentHandler::new(std::io::sink(), opts)
        .with_attrs(vec![Attr::string("service", "auth")])
        .with_group("ctx");
    run("indent", &indent, n);
}
