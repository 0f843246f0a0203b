//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sensorlink_protocol::{FlowControl, Parity, PayloadKind, StopBits, UartSettings};

/// Sensor link protocol tool.
#[derive(Parser, Debug)]
#[command(name = "sensorlink")]
#[command(version)]
#[command(about = "Encode, decode and stream frames of the sensor board serial protocol")]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. "debug", "sensorlink_engine=trace"). Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the wire frame of a command as hex
    Encode {
        /// Command to encode
        #[arg(value_enum)]
        command: CommandArg,

        #[command(flatten)]
        uart: UartArgs,
    },

    /// Decode one hex frame and print it as JSON
    Decode {
        /// Frame bytes as hex (spaces allowed)
        frame: String,

        /// Body expected when the device accepted the command
        #[arg(long, value_enum, default_value_t = PayloadArg::Empty)]
        payload: PayloadArg,
    },

    /// Feed a binary capture through the engine and print feed events
    Replay {
        /// Capture file
        file: PathBuf,

        /// Bytes per delivery (overrides the config file)
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Stream from a TCP serial bridge
    Connect {
        /// Bridge address, e.g. 127.0.0.1:9000
        addr: String,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
}

/// Commands the device understands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandArg {
    GetData,
    Stop,
    Reconfigure,
}

/// Expected response body.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadArg {
    Empty,
    Sensor,
    UartSettings,
}

impl From<PayloadArg> for PayloadKind {
    fn from(arg: PayloadArg) -> Self {
        match arg {
            PayloadArg::Empty => PayloadKind::Empty,
            PayloadArg::Sensor => PayloadKind::Sensor,
            PayloadArg::UartSettings => PayloadKind::UartSettings,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBitsArg {
    #[value(name = "1")]
    One,
    #[value(name = "1.5")]
    OneAndHalf,
    #[value(name = "2")]
    Two,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityArg {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControlArg {
    None,
    Hardware,
    Software,
}

/// UART overrides for `encode reconfigure`.
#[derive(Args, Debug, Clone, Default)]
pub struct UartArgs {
    /// Baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// Data bits
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Stop bits
    #[arg(long, value_enum)]
    pub stop_bits: Option<StopBitsArg>,

    /// Parity
    #[arg(long, value_enum)]
    pub parity: Option<ParityArg>,

    /// Flow control
    #[arg(long, value_enum)]
    pub flow_control: Option<FlowControlArg>,
}

impl UartArgs {
    /// Apply the flags that were given on top of `base`.
    pub fn apply(&self, base: UartSettings) -> UartSettings {
        UartSettings {
            baud_rate: self.baud.unwrap_or(base.baud_rate),
            data_bits: self.data_bits.unwrap_or(base.data_bits),
            stop_bits: self.stop_bits.map_or(base.stop_bits, |arg| match arg {
                StopBitsArg::One => StopBits::One,
                StopBitsArg::OneAndHalf => StopBits::OneAndHalf,
                StopBitsArg::Two => StopBits::Two,
            }),
            parity: self.parity.map_or(base.parity, |arg| match arg {
                ParityArg::None => Parity::None,
                ParityArg::Even => Parity::Even,
                ParityArg::Odd => Parity::Odd,
                ParityArg::Mark => Parity::Mark,
                ParityArg::Space => Parity::Space,
            }),
            flow_control: self.flow_control.map_or(base.flow_control, |arg| match arg {
                FlowControlArg::None => FlowControl::None,
                FlowControlArg::Hardware => FlowControl::Hardware,
                FlowControlArg::Software => FlowControl::Software,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode_reconfigure() {
        let cli = Cli::try_parse_from([
            "sensorlink",
            "encode",
            "reconfigure",
            "--baud",
            "9600",
            "--stop-bits",
            "1.5",
            "--parity",
            "odd",
        ])
        .unwrap();

        let Commands::Encode { command, uart } = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(command, CommandArg::Reconfigure);

        let settings = uart.apply(UartSettings::default());
        assert_eq!(settings.baud_rate, 9_600);
        assert_eq!(settings.stop_bits, StopBits::OneAndHalf);
        assert_eq!(settings.parity, Parity::Odd);
        assert_eq!(settings.data_bits, 8);
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "sensorlink",
            "decode",
            "AA0200E5",
            "--payload",
            "uart-settings",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::Decode {
                payload: PayloadArg::UartSettings,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["sensorlink", "encode", "reboot"]).is_err());
    }
}
