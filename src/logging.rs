use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::Record;

/// Route the `log` facade to `path`, appending one
/// `timestamp - LEVEL - message` line per record.
///
/// Level filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            let ts = buf.timestamp_millis();
            write_line(buf, &ts, record)
        })
        .init();
    Ok(())
}

fn write_line<W>(out: &mut W, ts: &dyn Display, record: &Record) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writeln!(out, "{} - {} - {}", ts, record.level(), record.args())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_line_format() {
        let mut out = Vec::new();
        write_line(
            &mut out,
            &"2026-10-19T08:00:00.000Z",
            &Record::builder()
                .args(format_args!("Processed email from: {}, Subject: {}", "a@b", "Hi"))
                .level(Level::Info)
                .build(),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2026-10-19T08:00:00.000Z - INFO - Processed email from: a@b, Subject: Hi\n"
        );
    }

    #[test]
    fn test_error_level_name() {
        let mut out = Vec::new();
        write_line(
            &mut out,
            &"t",
            &Record::builder()
                .args(format_args!("boom"))
                .level(Level::Error)
                .build(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "t - ERROR - boom\n");
    }
}
