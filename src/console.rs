// Telenode — Diagnostics console (AT-style)
//
//   AT           ping
//   AT$SEND      send a report now
//   AT$STATUS    print aggregates and counters
//   AT$BLINK     blink the LED three times
//   AT$LED=<0|1> LED off / on
//   AT+CLAC      list commands
//   AT$HELP      list commands with descriptions

use thiserror::Error;

use crate::ingest::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Send,
    Status,
    Led(bool),
    LedRange,
    Blink,
    Clac,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("not an AT command: {0:?}")]
    NotAt(String),
    #[error("unknown command: {0:?}")]
    Unknown(String),
    #[error("invalid parameter: {0:?}")]
    InvalidParameter(String),
}

/// Blinks requested by `AT$BLINK`.
pub const BLINK_COUNT: u8 = 3;

const COMMANDS: [(&str, &str); 6] = [
    ("AT$SEND", "Immediately send packet"),
    ("AT$STATUS", "Show status"),
    ("AT$BLINK", "LED blink 3 times"),
    ("AT$LED", "LED on/off"),
    ("AT+CLAC", "List all available AT commands"),
    ("AT$HELP", "This help"),
];

impl Command {
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let line = line.trim();
        let upper = line.to_ascii_uppercase();
        let rest = upper
            .strip_prefix("AT")
            .ok_or_else(|| ConsoleError::NotAt(line.to_string()))?;

        match rest {
            "" => Ok(Self::Ping),
            "$SEND" => Ok(Self::Send),
            "$STATUS" | "$STATUS?" => Ok(Self::Status),
            "$BLINK" => Ok(Self::Blink),
            "$LED=?" => Ok(Self::LedRange),
            "$LED=0" => Ok(Self::Led(false)),
            "$LED=1" => Ok(Self::Led(true)),
            _ if rest.starts_with("$LED=") => Err(ConsoleError::InvalidParameter(line.to_string())),
            "+CLAC" => Ok(Self::Clac),
            "$HELP" => Ok(Self::Help),
            _ => Err(ConsoleError::Unknown(line.to_string())),
        }
    }
}

/// `$STATUS` response lines.  A field without data prints an empty value.
pub fn status_lines(snapshot: &Snapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(5);

    for (name, value) in [("Voltage", snapshot.voltage), ("Temperature", snapshot.temperature)] {
        lines.push(match value {
            Some(v) => format!("$STATUS: \"{}\",{:.1}", name, v),
            None => format!("$STATUS: \"{}\",", name),
        });
    }

    lines.push(match snapshot.orientation {
        Some(face) => format!("$STATUS: \"Orientation\",{}", face),
        None => "$STATUS: \"Orientation\",".to_string(),
    });
    lines.push(format!("$STATUS: \"Click count\",{}", snapshot.clicks));
    lines.push(format!("$STATUS: \"Hold count\",{}", snapshot.holds));

    lines
}

pub fn clac_lines() -> Vec<String> {
    COMMANDS.iter().map(|(name, _)| name.to_string()).collect()
}

pub fn help_lines() -> Vec<String> {
    COMMANDS
        .iter()
        .map(|(name, help)| format!("{:<12}{}", name, help))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands_case_insensitively() {
        assert_eq!(Command::parse("AT"), Ok(Command::Ping));
        assert_eq!(Command::parse("at$send\r\n"), Ok(Command::Send));
        assert_eq!(Command::parse(" AT$STATUS? "), Ok(Command::Status));
        assert_eq!(Command::parse("AT+CLAC"), Ok(Command::Clac));
        assert_eq!(Command::parse("AT$HELP"), Ok(Command::Help));
        assert_eq!(Command::parse("at$blink"), Ok(Command::Blink));
        assert_eq!(Command::parse("AT$LED=1"), Ok(Command::Led(true)));
        assert_eq!(Command::parse("AT$LED=0"), Ok(Command::Led(false)));
        assert_eq!(Command::parse("AT$LED=?"), Ok(Command::LedRange));
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(
            Command::parse("AT$REBOOT"),
            Err(ConsoleError::Unknown("AT$REBOOT".into()))
        );
        assert_eq!(Command::parse("hello"), Err(ConsoleError::NotAt("hello".into())));
        assert_eq!(
            Command::parse("AT$LED=2"),
            Err(ConsoleError::InvalidParameter("AT$LED=2".into()))
        );
    }

    #[test]
    fn status_with_and_without_data() {
        let lines = status_lines(&Snapshot {
            voltage: Some(3.04),
            temperature: None,
            orientation: Some(2),
            clicks: 7,
            holds: 0,
        });
        assert_eq!(
            lines,
            vec![
                "$STATUS: \"Voltage\",3.0",
                "$STATUS: \"Temperature\",",
                "$STATUS: \"Orientation\",2",
                "$STATUS: \"Click count\",7",
                "$STATUS: \"Hold count\",0",
            ]
        );
    }

    #[test]
    fn command_listings() {
        assert_eq!(clac_lines().len(), 6);
        assert!(clac_lines().contains(&"AT$LED".to_string()));
        assert!(help_lines()[0].starts_with("AT$SEND"));
        assert!(help_lines()[0].ends_with("Immediately send packet"));
    }
}
