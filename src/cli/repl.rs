use crate::controller::{ControllerState, ServerController, StopOutcome};
use crate::host::{serve, HostValue, ServeOutcome};
use crate::lock::HostLock;
use std::io::{self, BufRead, Write};

/// Split a line into tokens. Single and double quotes group words; inside double
/// quotes `\"` and `\\` are unescaped. The flag tells whether a token was quoted.
pub fn tokenize(line: &str) -> Result<Vec<(String, bool)>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' || c == '\'' {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == c {
                    closed = true;
                    break;
                }
                if ch == '\\' && c == '"' {
                    match chars.next() {
                        Some(escaped @ ('"' | '\\')) => token.push(escaped),
                        Some('n') => token.push('\n'),
                        Some(other) => {
                            token.push('\\');
                            token.push(other);
                        }
                        None => token.push('\\'),
                    }
                    continue;
                }
                token.push(ch);
            }
            if !closed {
                return Err(format!("unterminated {} quote", c));
            }
            tokens.push((token, true));
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push((token, false));
        }
    }

    Ok(tokens)
}

/// Turn tokens into host values: quoted tokens are strings, bare tokens are
/// integers, reals or booleans when they parse as such.
pub fn parse_args(tokens: &[(String, bool)]) -> Vec<HostValue> {
    tokens
        .iter()
        .map(|(token, quoted)| {
            if *quoted {
                return HostValue::Str(token.clone());
            }
            if let Ok(n) = token.parse::<i64>() {
                HostValue::Int(n)
            } else if let Ok(x) = token.parse::<f64>() {
                HostValue::Real(x)
            } else if let Ok(b) = token.parse::<bool>() {
                HostValue::Bool(b)
            } else {
                HostValue::Str(token.clone())
            }
        })
        .collect()
}

/// Read commands from `input` until `quit` or end of input.
///
/// A listener still running when the loop ends is stopped.
pub fn run_repl<L, R, W>(controller: &ServerController<L>, input: R, mut output: W) -> io::Result<()>
where
    L: HostLock,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let tokens = match tokenize(&line) {
            Ok(tokens) => tokens,
            Err(e) => {
                writeln!(output, "error: {}", e)?;
                continue;
            }
        };
        let Some(((command, _), rest)) = tokens.split_first() else {
            continue;
        };

        match command.as_str() {
            "serve" => match serve(controller, &parse_args(rest)) {
                Ok(outcome) => writeln!(output, "{}", describe(outcome))?,
                Err(e) => writeln!(output, "error: {}", e)?,
            },
            "status" => match controller.state() {
                ControllerState::Idle => writeln!(output, "idle")?,
                ControllerState::Running { addr } => writeln!(
                    output,
                    "running on {} ({} bytes)",
                    addr,
                    controller.document().len()
                )?,
            },
            "quit" | "exit" => break,
            other => writeln!(output, "error: unknown command '{}'", other)?,
        }
    }

    if let StopOutcome::Stopped { addr } = controller.stop() {
        writeln!(output, "stopped {}", addr)?;
    }
    Ok(())
}

fn describe(outcome: ServeOutcome) -> String {
    match outcome {
        ServeOutcome::Serving(ControllerState::Running { addr }) => format!("serving on {}", addr),
        ServeOutcome::Serving(ControllerState::Idle) => "idle".to_string(),
        ServeOutcome::Stopped(StopOutcome::Stopped { addr }) => format!("stopped {}", addr),
        ServeOutcome::Stopped(StopOutcome::AlreadyIdle) => "not running".to_string(),
    }
}
