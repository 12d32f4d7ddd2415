use rustyline::error::ReadlineError;
use rustyline::Editor;

use lox_interpreter::{builtin, sink::Stdout, Evaluator, Object};
use lox_parser::SyntaxError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn repl(max_depth: usize) {
    println!("lox v{}", VERSION);

    // One evaluator for the whole session, so definitions carry over between lines
    let mut stdout = Stdout;
    let mut evaluator = Evaluator::new(&mut stdout).with_max_depth(max_depth);
    evaluator.define_builtin(builtin::record());
    evaluator.define_builtin(builtin::clock());

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                if line.trim() == "exit" || line.trim() == "quit" {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                match lox_parser::parse(&line) {
                    Ok(prog) => match evaluator.eval(&prog) {
                        // Echo the value of a trailing expression
                        Ok(Some(value)) if value != Object::Nil => {
                            println!("{}", value.to_code_string())
                        }
                        Ok(_) => {}
                        Err(err) => println!("Error: {}", err),
                    },
                    Err(errors) => print_syntax_errors(&errors),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}

pub fn print_syntax_errors(errors: &[SyntaxError]) {
    println!("Parser errors:");
    for error in errors {
        println!("\t{}", error);
    }
}
