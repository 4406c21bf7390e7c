use rolematrix::extract_codes;

/// Prints the application codes found in the given group names, one per
/// line, sorted.
#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Network group names
    #[arg(required = true)]
    groups: Vec<String>,
}

impl Command {
    pub fn run(self) {
        for code in extract_codes(&self.groups) {
            println!("{code}");
        }
    }
}
