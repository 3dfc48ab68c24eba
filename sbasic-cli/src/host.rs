//! `StdioHost`: a minimal stand-in for the out-of-scope terminal IDE
//! (spec.md §1, §6). It satisfies [`sbasic_eval::Host`] over plain
//! stdin/stdout so a `.bas` file can run end to end from the command line;
//! it does not attempt the real IDE's cell-based screen, palette, or
//! graphics rasterisation — `set_cell`/`show` are left at the trait's
//! no-op defaults, and `locate`/`clear`/`set_color` use plain ANSI escapes
//! since every common terminal honours them.

use std::io::{self, BufRead, Write};

use sbasic_eval::Host;

#[derive(Default)]
pub struct StdioHost {
    stdin: Option<io::BufReader<io::Stdin>>,
}

impl StdioHost {
    pub fn new() -> Self {
        StdioHost { stdin: None }
    }

    fn reader(&mut self) -> &mut io::BufReader<io::Stdin> {
        self.stdin.get_or_insert_with(|| io::BufReader::new(io::stdin()))
    }
}

impl Host for StdioHost {
    fn print(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn input(&mut self, prompt: &str) -> String {
        if !prompt.is_empty() {
            print!("{prompt}");
            let _ = io::stdout().flush();
        }
        let mut line = String::new();
        if self.reader().read_line(&mut line).unwrap_or(0) == 0 {
            return String::new();
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        line
    }

    fn key(&mut self) -> Option<char> {
        // No raw-mode key buffer over plain stdio; INKEY$ always reports
        // "nothing pending" here, matching spec.md §6's "Host may stub
        // these".
        None
    }

    fn locate(&mut self, row: u16, col: u16) {
        print!("\x1b[{};{}H", row.max(1), col.max(1));
        let _ = io::stdout().flush();
    }

    fn set_color(&mut self, fg: u8, bg: u8) {
        print!("\x1b[38;5;{fg}m\x1b[48;5;{bg}m");
        let _ = io::stdout().flush();
    }

    fn clear(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }
}
