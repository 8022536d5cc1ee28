use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialises the global logger. `RUST_LOG` wins over the configured
/// filter; `-v`/`-vv` raise the level of the configured one. Logs go to
/// stderr so command output stays pipeable.
pub fn init(config_filter: &str, verbose: u8) {
  if std::env::var("RUST_LOG").is_ok() {
    let _ = Builder::from_default_env().target(Target::Stderr).try_init();
    return;
  }

  let mut builder = Builder::new();
  builder.target(Target::Stderr).parse_filters(config_filter);

  match verbose {
    0 => {}
    1 => {
      builder.filter_level(LevelFilter::Debug);
    }
    _ => {
      builder.filter_level(LevelFilter::Trace);
    }
  }

  let _ = builder.try_init();
}
