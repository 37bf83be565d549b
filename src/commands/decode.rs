//! Decode command implementation

use std::path::Path;

use flashsniff_core::{
    read_capture_file, Analyzer, AnalyzerStats, Assembler, BusEvent, CommandClasses, DecodeLevel,
    FilterConfig, Frame, LineRoles,
};

use crate::cli::{FilterArgs, Level, LineArgs, Mode};

impl From<Level> for DecodeLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Opcode => DecodeLevel::Opcode,
            Level::Address => DecodeLevel::Address,
            Level::Full => DecodeLevel::Full,
            Level::Errors => DecodeLevel::Errors,
        }
    }
}

/// Build the filter configuration: file first, command-line flags on top
pub fn build_config(args: &FilterArgs) -> Result<FilterConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let config = FilterConfig::from_toml_file(path)?;
            log::info!("Loaded configuration from {:?}", path);
            config
        }
        None => FilterConfig::new(),
    };

    if let Some(bytes) = args.address_width {
        config = config.with_address_bytes(bytes)?;
    }
    if let Some(min) = args.min_address {
        config = config.with_min_address(min);
    }
    if let Some(max) = args.max_address {
        config = config.with_max_address(max);
    }
    if let Some(level) = args.level {
        config = config.with_decode_level(level.into());
    }
    if !args.classes.is_empty() {
        let classes = CommandClasses::from_names(args.classes.iter().map(String::as_str))
            .map_err(|e| format!("{} in --classes {}", e, args.classes.join(",")))?;
        config = config.with_classes(classes);
    }
    if args.track_address_mode {
        config = config.with_address_mode_tracking(true);
    }

    config.validate()?;
    Ok(config)
}

/// Build the parallel line assignment
pub fn build_roles(args: &LineArgs) -> Result<LineRoles, Box<dyn std::error::Error>> {
    let [io0, io1, io2, io3] = args.io_lines[..] else {
        return Err(format!(
            "--io-lines needs exactly 4 lines, got {}",
            args.io_lines.len()
        )
        .into());
    };
    let roles = LineRoles {
        io0,
        io1,
        io2,
        io3,
        cs: (!args.no_cs).then_some(args.cs_line),
    };
    roles.validate()?;
    Ok(roles)
}

/// Decode a capture file and print the emitted frames
pub fn run(
    input: &Path,
    mode: Mode,
    filter: &FilterArgs,
    lines: &LineArgs,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(filter)?;
    let events = read_capture_file(input)?;
    log::info!("Read {} events from {:?}", events.len(), input);

    let summary = match mode {
        Mode::Spi => decode_events(Analyzer::spi(config)?, &events),
        Mode::Parallel => decode_events(Analyzer::parallel(config, build_roles(lines)?)?, &events),
    };

    if stats {
        println!();
        println!("Transactions: {}", summary.transactions);
        println!("Frames:       {}", summary.emitted);
        println!("Suppressed:   {}", summary.suppressed);
        println!("Unknown:      {}", summary.unknown);
        println!("Truncated:    {}", summary.truncated);
    }

    Ok(())
}

fn decode_events<A: Assembler>(mut analyzer: Analyzer<A>, events: &[BusEvent]) -> AnalyzerStats {
    for event in events {
        for frame in analyzer.ingest(event) {
            print_frame(&frame);
        }
    }
    for frame in analyzer.flush() {
        print_frame(&frame);
    }
    analyzer.stats()
}

fn print_frame(frame: &Frame) {
    println!(
        "{:>12} - {:>12} ns  {:<8} {}",
        frame.start,
        frame.end,
        frame.class.name(),
        frame
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashsniff_core::{AddressWidth, CommandClass};

    #[test]
    fn test_flags_build_config() {
        let args = FilterArgs {
            address_width: Some(4),
            min_address: Some(0x1000),
            max_address: Some(0x1FFF),
            level: Some(Level::Address),
            classes: vec!["read".into(), "erase".into()],
            track_address_mode: true,
            ..Default::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.address_width, AddressWidth::FourByte);
        assert_eq!(config.address_range(), Some((0x1000, 0x1FFF)));
        assert_eq!(config.decode_level, DecodeLevel::Address);
        assert!(config.classes.allows(CommandClass::Erase));
        assert!(!config.classes.allows(CommandClass::Program));
        assert!(config.track_address_mode);
    }

    #[test]
    fn test_errors_level_flag() {
        let args = FilterArgs {
            level: Some(Level::Errors),
            ..Default::default()
        };
        let config = build_config(&args).unwrap();
        assert!(config.decode_level.errors_only());
    }

    #[test]
    fn test_flags_rejected() {
        let args = FilterArgs {
            min_address: Some(0x2000),
            max_address: Some(0x1000),
            ..Default::default()
        };
        assert!(build_config(&args).is_err());

        let args = FilterArgs {
            classes: vec!["flash".into()],
            ..Default::default()
        };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_build_roles() {
        let args = LineArgs {
            io_lines: vec![4, 5, 6, 7],
            cs_line: 15,
            no_cs: true,
        };
        let roles = build_roles(&args).unwrap();
        assert_eq!(roles.io0, 4);
        assert_eq!(roles.cs, None);

        let args = LineArgs {
            io_lines: vec![0, 1],
            cs_line: 15,
            no_cs: false,
        };
        assert!(build_roles(&args).is_err());

        let args = LineArgs {
            io_lines: vec![0, 1, 2, 3],
            cs_line: 16,
            no_cs: false,
        };
        assert!(build_roles(&args).is_err());
    }
}
