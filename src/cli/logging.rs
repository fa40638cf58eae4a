use env_logger::{Builder, Env, Target};
use std::{fs::File, io, io::Write};

/// Logs `name - level - message` lines into `path`, truncating it.
pub fn init_logging(path: &str) -> io::Result<()> {
    let file = File::create(path)?;
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                record.target(),
                record.level(),
                record.args()
            )
        })
        .init();
    Ok(())
}
