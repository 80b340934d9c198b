use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;

use flight::RouteChoice;
use model::SpeedSetting;

use crate::App;

/// One line of a control script, standing in for a button press or the passage of time.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Reset,
    StepForwards,
    StepBackwards,
    Seek(f64),
    Speed(f64),
    Faster,
    Slower,
    Route(RouteChoice),
    Wait(Duration),
    /// Let the current playback run to the end
    Finish,
}

pub struct TimeControls {
    setting: SpeedSetting,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, Some(arg.trim())),
            None => (line, None),
        };
        let number = |what: &str| -> Result<f64> {
            let arg = arg.ok_or_else(|| anyhow!("{verb} needs {what}"))?;
            arg.parse::<f64>()
                .map_err(|err| anyhow!("bad {what} {arg}: {err}"))
        };

        Ok(match (verb, arg) {
            ("play", None) => Command::Play,
            ("pause", None) => Command::Pause,
            ("reset", None) => Command::Reset,
            ("step", Some("forwards")) => Command::StepForwards,
            ("step", Some("backwards")) => Command::StepBackwards,
            ("seek", _) => Command::Seek(number("a percentage")?),
            ("speed", _) => Command::Speed(number("a multiplier")?),
            ("faster", None) => Command::Faster,
            ("slower", None) => Command::Slower,
            ("route", Some(route)) => Command::Route(route.parse()?),
            ("wait", _) => {
                let ms = number("milliseconds")?;
                if !(ms.is_finite() && ms >= 0.0) {
                    bail!("can't wait {ms}ms");
                }
                Command::Wait(
                    Duration::try_from_secs_f64(ms / 1000.0)
                        .map_err(|err| anyhow!("can't wait {ms}ms: {err}"))?,
                )
            }
            ("finish", None) => Command::Finish,
            _ => bail!("unknown command {line:?}"),
        })
    }
}

/// Blank lines and `#` comments are skipped. Errors name the line.
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<Command>() {
            Ok(cmd) => commands.push(cmd),
            Err(err) => bail!("line {}: {}", idx + 1, err),
        }
    }
    Ok(commands)
}

impl TimeControls {
    pub fn new(app: &mut App, speed: f64) -> Result<Self> {
        if !app.engine.set_speed(speed) {
            bail!("Speed must be positive, not {speed}");
        }
        let setting = SpeedSetting::from_multiplier(speed).unwrap_or_else(|| {
            debug!("{speed}x isn't one of the offered speeds");
            SpeedSetting::default()
        });
        Ok(Self { setting })
    }

    pub fn event(&mut self, app: &mut App, cmd: Command) {
        debug!("{:?}", cmd);
        match cmd {
            Command::Play => app.engine.play(),
            Command::Pause => app.engine.pause(),
            Command::Reset => app.engine.reset(),
            Command::StepForwards => app.engine.step_forward(),
            Command::StepBackwards => app.engine.step_backward(),
            Command::Seek(pct) => app.engine.seek(pct),
            Command::Speed(x) => {
                if app.engine.set_speed(x) {
                    if let Some(setting) = SpeedSetting::from_multiplier(x) {
                        self.setting = setting;
                    }
                }
            }
            Command::Faster => self.change_setting(app, self.setting.faster()),
            Command::Slower => self.change_setting(app, self.setting.slower()),
            Command::Route(route) => app.select(route),
            Command::Wait(dt) => {
                app.wait(dt);
                return;
            }
            Command::Finish => {
                app.finish();
                return;
            }
        }
        app.log_frame();
    }

    pub fn setting(&self) -> SpeedSetting {
        self.setting
    }

    fn change_setting(&mut self, app: &mut App, setting: SpeedSetting) {
        if setting != self.setting {
            info!("Switching to {}", setting);
        }
        self.setting = setting;
        app.engine.set_speed(setting.multiplier());
    }
}
