use std::path::PathBuf;

use nowplaying::streaming::types::{DEFAULT_BASE_URL, DEFAULT_PUSH_PORT_RANGE};

pub const URL_ENV: &str = "NOWPLAYING_URL";

pub const USAGE: &str = "\
Usage: nowplaying-cli [OPTIONS]

Options:
  --url <URL>            Backend base URL (default: $NOWPLAYING_URL or http://127.0.0.1:5000)
  --push [START-END]     Listen for pushed updates on a port from the range (default: 8080-8090)
  --no-lyrics            Do not fetch lyrics
  --log-file <PATH>      Write logs to PATH (default: <tmp>/nowplaying.log)
  -v, --verbose          Log debug output
  -h, --help             Print this help

Keys:
  q, Esc                 Quit
  r                      Refresh now
  j/k, Down/Up           Scroll lyrics";

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
  pub base_url: String,
  pub push_ports: Option<(u16, u16)>,
  pub fetch_lyrics: bool,
  pub log_file: PathBuf,
  pub verbose: bool,
}

impl Options {
  fn with_base_url(base_url: String) -> Self {
    Self {
      base_url,
      push_ports: None,
      fetch_lyrics: true,
      log_file: std::env::temp_dir().join("nowplaying.log"),
      verbose: false,
    }
  }
}

#[derive(Debug, PartialEq)]
pub enum Command {
  Run(Options),
  Help,
}

/// Parse command line arguments (without the program name)
///
/// `env_url` is the value of `NOWPLAYING_URL`, if set; `--url` wins over it.
pub fn parse<I>(args: I, env_url: Option<String>) -> Result<Command, String>
where
  I: IntoIterator<Item = String>,
{
  let base_url = env_url
    .filter(|url| !url.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
  let mut options = Options::with_base_url(base_url);
  let mut args = args.into_iter().peekable();

  while let Some(arg) = args.next() {
    match arg.as_str() {
      "-h" | "--help" => return Ok(Command::Help),
      "--url" => {
        options.base_url = args.next().ok_or("--url requires a value")?;
      }
      "--push" => {
        let range = match args.peek() {
          Some(next) if !next.starts_with('-') => {
            let value = args.next().unwrap_or_default();
            parse_port_range(&value)?
          }
          _ => DEFAULT_PUSH_PORT_RANGE,
        };
        options.push_ports = Some(range);
      }
      "--no-lyrics" => options.fetch_lyrics = false,
      "--log-file" => {
        let path = args.next().ok_or("--log-file requires a value")?;
        options.log_file = PathBuf::from(path);
      }
      "-v" | "--verbose" => options.verbose = true,
      other => return Err(format!("Unknown argument: {}", other)),
    }
  }

  Ok(Command::Run(options))
}

fn parse_port_range(value: &str) -> Result<(u16, u16), String> {
  let invalid = || format!("Invalid port range '{}', expected START-END", value);
  let (start, end) = value.split_once('-').ok_or_else(invalid)?;
  let start = start.trim().parse::<u16>().map_err(|_| invalid())?;
  let end = end.trim().parse::<u16>().map_err(|_| invalid())?;
  Ok((start, end))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  fn run_options(list: &[&str], env_url: Option<&str>) -> Options {
    match parse(args(list), env_url.map(str::to_string)).unwrap() {
      Command::Run(options) => options,
      Command::Help => panic!("expected run options"),
    }
  }

  #[test]
  fn test_defaults() {
    let options = run_options(&[], None);
    assert_eq!(options.base_url, DEFAULT_BASE_URL);
    assert_eq!(options.push_ports, None);
    assert!(options.fetch_lyrics);
    assert!(!options.verbose);
  }

  #[test]
  fn test_url_from_env_and_flag() {
    assert_eq!(run_options(&[], Some("http://pi:5000")).base_url, "http://pi:5000");
    assert_eq!(
      run_options(&["--url", "http://other:1"], Some("http://pi:5000")).base_url,
      "http://other:1"
    );
    assert_eq!(run_options(&[], Some("  ")).base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn test_push_flag() {
    assert_eq!(run_options(&["--push"], None).push_ports, Some(DEFAULT_PUSH_PORT_RANGE));
    assert_eq!(
      run_options(&["--push", "9000-9010"], None).push_ports,
      Some((9000, 9010))
    );
    assert_eq!(
      run_options(&["--push", "--no-lyrics"], None).push_ports,
      Some(DEFAULT_PUSH_PORT_RANGE)
    );
    assert!(parse(args(&["--push", "9000"]), None).is_err());
    assert!(parse(args(&["--push", "a-b"]), None).is_err());
  }

  #[test]
  fn test_other_flags() {
    let options = run_options(&["--no-lyrics", "-v", "--log-file", "/tmp/np.log"], None);
    assert!(!options.fetch_lyrics);
    assert!(options.verbose);
    assert_eq!(options.log_file, PathBuf::from("/tmp/np.log"));
  }

  #[test]
  fn test_help_and_errors() {
    assert_eq!(parse(args(&["--help"]), None).unwrap(), Command::Help);
    assert!(parse(args(&["--url"]), None).is_err());
    assert!(parse(args(&["--bogus"]), None).is_err());
  }
}
