use crate::render;
use dealrun_core::{Run, RunError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    State,
    Map,
    Go(usize),
    Play(Vec<usize>),
    Discard(Vec<usize>),
    Preview(Vec<usize>),
    Buy(String),
    Upgrade,
    Sell(usize),
    Leave,
    Auto(usize),
    Json,
    New(Option<u64>),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// `Ok(None)` for blank input.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();
    let command = match cmd {
        "help" | "h" | "?" => Command::Help,
        "state" | "s" => Command::State,
        "map" | "m" => Command::Map,
        "go" | "g" => Command::Go(parse_single(&args, "node choice")?),
        "play" | "p" => Command::Play(parse_indices(&args)?),
        "discard" | "d" => Command::Discard(parse_indices(&args)?),
        "preview" | "score" => Command::Preview(parse_indices(&args)?),
        "buy" | "b" => {
            let id = args.first().ok_or("missing joker id")?;
            Command::Buy((*id).to_string())
        }
        "upgrade" | "u" => Command::Upgrade,
        "sell" => Command::Sell(parse_single(&args, "joker index")?),
        "leave" | "l" => Command::Leave,
        "auto" => {
            let steps = match args.first() {
                Some(value) => value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid step count '{value}'"))?,
                None => 1,
            };
            Command::Auto(steps)
        }
        "json" => Command::Json,
        "new" => {
            let seed = match args.first() {
                Some(value) => Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid seed '{value}'"))?,
                ),
                None => None,
            };
            Command::New(seed)
        }
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn parse_single(args: &[&str], what: &str) -> Result<usize, String> {
    let value = args.first().ok_or_else(|| format!("missing {what}"))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid {what} '{value}'"))
}

/// Longest range a single `a-b` token may expand to; no selection is larger.
const MAX_RANGE_LEN: usize = 5;

/// Accepts `0 1 2`, `0,1,2` and ranges such as `0-4`.
pub fn parse_indices(args: &[&str]) -> Result<Vec<usize>, String> {
    let mut indices = Vec::new();
    for arg in args {
        for part in arg.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let start = start
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range start".to_string())?;
                let end = end
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range end".to_string())?;
                if start > end {
                    return Err("range start larger than end".to_string());
                }
                if end - start >= MAX_RANGE_LEN {
                    return Err(format!("range {part} covers more than {MAX_RANGE_LEN} cards"));
                }
                indices.extend(start..=end);
            } else {
                let idx = part
                    .parse::<usize>()
                    .map_err(|_| format!("invalid index '{part}'"))?;
                indices.push(idx);
            }
        }
    }
    if indices.is_empty() {
        return Err("missing indices".to_string());
    }
    Ok(indices)
}

/// Applies one command. `New` is handled by the caller since it replaces
/// the run.
pub fn execute(run: &mut Run, command: Command) -> Result<Flow, RunError> {
    match command {
        Command::Help => render::print_help(),
        Command::State => render::print_state(run),
        Command::Map => render::print_map(run),
        Command::Go(choice) => {
            let reachable = run.reachable_nodes();
            match reachable.get(choice) {
                Some(id) => {
                    run.choose_next_node(*id)?;
                    render::print_state(run);
                }
                None => println!("choose 0..{} from the reachable list", reachable.len()),
            }
        }
        Command::Play(indices) => {
            let outcome = run.play_hand(&indices)?;
            render::print_outcome(&outcome);
            render::print_state(run);
        }
        Command::Discard(indices) => {
            run.discard(&indices)?;
            render::print_state(run);
        }
        Command::Preview(indices) => {
            let outcome = run.preview_hand(&indices)?;
            render::print_outcome(&outcome);
        }
        Command::Buy(id) => {
            run.buy_joker(&id)?;
            render::print_state(run);
        }
        Command::Upgrade => {
            let category = run.upgrade_hand()?;
            println!("{category} is now level {}", run.hand_level(category));
        }
        Command::Sell(index) => {
            let value = run.sell_joker(index)?;
            println!("sold for {value}");
        }
        Command::Leave => {
            run.leave_shop()?;
            render::print_state(run);
        }
        Command::Auto(steps) => {
            let report = crate::auto::run_auto(run, steps);
            println!("auto: {} steps", report.steps);
            render::print_state(run);
        }
        Command::Json => match serde_json::to_string_pretty(&run.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("error: {err}"),
        },
        Command::New(_) => {}
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! parse_case {
        ($name:ident, $line:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(parse_command($line), Ok(Some($expected)));
            }
        };
    }

    parse_case!(parse_play_list, "play 0 1 2", Command::Play(vec![0, 1, 2]));
    parse_case!(parse_play_commas, "p 0,3,4", Command::Play(vec![0, 3, 4]));
    parse_case!(parse_play_range, "play 0-4", Command::Play(vec![0, 1, 2, 3, 4]));
    parse_case!(parse_discard, "d 5 6", Command::Discard(vec![5, 6]));
    parse_case!(parse_go, "go 1", Command::Go(1));
    parse_case!(parse_buy, "buy moon", Command::Buy("moon".to_string()));
    parse_case!(parse_new_with_seed, "new 42", Command::New(Some(42)));
    parse_case!(parse_new_default, "new", Command::New(None));
    parse_case!(parse_auto_default, "auto", Command::Auto(1));
    parse_case!(parse_quit, "exit", Command::Quit);

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_command("play").is_err());
        assert!(parse_command("play 4-1").is_err());
        assert!(parse_command("play 0-4000000000").is_err());
        assert!(parse_command("discard 2-7").is_err());
        assert!(parse_command("go x").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut run = Run::new_run(1);
        assert_eq!(execute(&mut run, Command::Quit), Ok(Flow::Quit));
    }

    #[test]
    fn go_enters_the_start_node() {
        let mut run = Run::new_run(1);
        assert_eq!(execute(&mut run, Command::Go(0)), Ok(Flow::Continue));
        assert!(run.phase.in_encounter());
    }
}
