/// Where `print` statements send their output, one line per call.
pub trait Sink {
    fn emit(&mut self, line: &str);
}

/// Collects printed lines, e.g. to inspect them in tests.
impl Sink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

/// Writes printed lines to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Sink for Stdout {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}
