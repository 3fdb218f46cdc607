use anyhow::{Context, anyhow, bail};
use clap::ValueEnum;
use minegrid_core::{Action, Coord, Difficulty};

/// Board presets as accepted on the command line and by the `n` command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Act { action: Action, row: Coord, col: Coord },
    NewGame(Option<Difficulty>),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  o <row> <col>           open a cell, or chord on an opened number
  f <row> <col>           toggle a flag
  n [easy|normal|hard]    start a new game
  h                       show this help
  q                       quit";

impl Command {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };

        let command = match verb {
            "o" | "open" => Self::act(Action::Open, &mut words)?,
            "f" | "flag" => Self::act(Action::Flag, &mut words)?,
            "n" | "new" => match words.next() {
                Some(name) => {
                    let arg = DifficultyArg::from_str(name, true)
                        .map_err(|_| anyhow!("unknown difficulty {name:?}"))?;
                    Self::NewGame(Some(arg.into()))
                }
                None => Self::NewGame(None),
            },
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("unknown command {other:?}, try \"h\""),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument {extra:?}");
        }
        Ok(command)
    }

    fn act<'a>(action: Action, words: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<Self> {
        let row = parse_coord(words.next(), "row")?;
        let col = parse_coord(words.next(), "column")?;
        Ok(Self::Act { action, row, col })
    }
}

fn parse_coord(word: Option<&str>, name: &str) -> anyhow::Result<Coord> {
    let word = word.with_context(|| format!("missing {name}"))?;
    word.parse()
        .with_context(|| format!("{name} must be a number between 0 and {}", Coord::MAX))
}
