//! Operator command parsing and the stdin reader thread.

use std::io::BufRead;

use barpanel_core::OperatorInput;
use crossbeam_channel::Sender;

pub const USAGE: &str = "commands: pump <1-8> | cal start|stop|submit <ml> | \
prime start|stop|submit | volumes <total>/<remaining> ... | dismiss | ack | \
estop | quit";

/// Parse one operator command line. Empty lines yield nothing.
pub fn parse_command(line: &str) -> Result<Option<OperatorInput>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let input = match head {
        "pump" => {
            let id = parts
                .next()
                .ok_or("pump needs an id, e.g. `pump 3`")?
                .parse::<u8>()
                .map_err(|_| "pump id must be a number".to_string())?;
            OperatorInput::SelectPump(id)
        }
        "cal" => match parts.next() {
            Some("start") => OperatorInput::StartCalibration,
            Some("stop") => OperatorInput::StopCalibration,
            Some("submit") => {
                let ml = parts
                    .next()
                    .ok_or("cal submit needs a volume in ml")?
                    .parse::<f32>()
                    .map_err(|_| "volume must be a number".to_string())?;
                OperatorInput::SubmitCalibration(ml)
            }
            _ => return Err("cal takes start, stop or submit <ml>".to_string()),
        },
        "prime" => match parts.next() {
            Some("start") => OperatorInput::StartPriming,
            Some("stop") => OperatorInput::StopPriming,
            Some("submit") => OperatorInput::SubmitPriming,
            _ => return Err("prime takes start, stop or submit".to_string()),
        },
        "volumes" => {
            let mut pairs = Vec::new();
            for entry in parts.by_ref() {
                let (total, remaining) = entry
                    .split_once('/')
                    .ok_or("volumes entries look like <total>/<remaining>, e.g. 700/250")?;
                let total = total
                    .parse::<f32>()
                    .map_err(|_| "total volume must be a number".to_string())?;
                let remaining = remaining
                    .parse::<f32>()
                    .map_err(|_| "remaining volume must be a number".to_string())?;
                pairs.push((total, remaining));
            }
            if pairs.is_empty() {
                return Err("volumes needs at least one <total>/<remaining> pair".to_string());
            }
            OperatorInput::SubmitVolumes(pairs)
        }
        "dismiss" => OperatorInput::AcknowledgeSuccess,
        "ack" => OperatorInput::AcknowledgeError,
        "estop" => OperatorInput::EmergencyStop,
        "quit" | "exit" => OperatorInput::Shutdown,
        other => return Err(format!("unknown command {other:?}; {USAGE}")),
    };
    if parts.next().is_some() {
        return Err(format!("trailing input after command; {USAGE}"));
    }
    Ok(Some(input))
}

/// Read operator commands from stdin until EOF or `quit`, forwarding them to
/// the panel loop. EOF shuts the panel down.
pub fn spawn_stdin_reader(tx: Sender<OperatorInput>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Ok(Some(input)) => {
                    let stop = input == OperatorInput::Shutdown;
                    if tx.send(input).is_err() || stop {
                        return;
                    }
                }
                Ok(None) => {}
                Err(msg) => eprintln!("{msg}"),
            }
        }
        let _ = tx.send(OperatorInput::Shutdown);
    })
}
