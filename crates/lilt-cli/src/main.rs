use std::{env, fs, io::Read as _, process::ExitCode};

use lilt::{Runner, StdInput, StdPrint, documentation};

const USAGE_MSG: &str = "\
lilt [options] file ...
options: -h
         --docs
         --debug
file: SCRIPT
      -(STDIN)

There can be arguments for the script after \"file\".";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let (code, script_name, program_args) = match args.get(1).map(String::as_str) {
        None | Some("-") => {
            if args.len() > 2 {
                eprintln!("{USAGE_MSG}");
                return ExitCode::FAILURE;
            }
            let mut code = String::new();
            if let Err(err) = std::io::stdin().lock().read_to_string(&mut code) {
                eprintln!("error: stdin: {err}");
                return ExitCode::FAILURE;
            }
            (code, "-".to_owned(), vec!["-".to_owned()])
        }
        Some("-h") => {
            println!("{USAGE_MSG}");
            return ExitCode::SUCCESS;
        }
        Some("--docs") => {
            println!("{}", documentation());
            return ExitCode::SUCCESS;
        }
        Some("--debug") => {
            eprintln!("error: the interactive debugger is not included in this build");
            return ExitCode::FAILURE;
        }
        Some(file_path) => {
            let code = match fs::read_to_string(file_path) {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("error: {file_path}: {err}");
                    return ExitCode::FAILURE;
                }
            };
            // the script sees its own path as argv's first element
            (code, file_path.to_owned(), args[1..].to_vec())
        }
    };

    let runner = match Runner::new(&code, &script_name, program_args) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match runner.run(&mut StdPrint, &mut StdInput) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
