//! Output filtering and frame labels
//!
//! [`filter`] decides whether a decoded command is shown and how much of
//! it. The class allow-set is applied first, then the address window. The
//! window only ever applies to commands that carry an address: status
//! polls, ID reads and resets pass through whatever range is configured.
//!
//! For payload-bearing commands the whole addressed span
//! `[address, address + len - 1]` is compared against the window, and at
//! the `full` level the payload is clipped to the overlapping part. The
//! `errors` level behaves like `full` but drops every complete command.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::assembler::Transaction;
use crate::class::CommandClass;
use crate::config::FilterConfig;
use crate::decoder::DecodedCommand;
use crate::event::Timestamp;
use crate::spi::AddressWidth;

/// One labeled result, ready to be shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Start of the transaction
    pub start: Timestamp,
    /// End of the transaction
    pub end: Timestamp,
    /// Opcode byte
    pub opcode: u8,
    /// Command name, `None` for unknown opcodes
    pub name: Option<&'static str>,
    /// Class tag
    pub class: CommandClass,
    /// Address, present at the address and full levels
    pub address: Option<u32>,
    /// Width used to format the address
    pub address_width: Option<AddressWidth>,
    /// Address of the first byte in `payload`
    pub payload_address: Option<u32>,
    /// Payload bytes, present at the full level for commands with a data phase
    pub payload: Option<Vec<u8>>,
    /// The transaction ended before the command was complete
    pub malformed: bool,
}

impl Frame {
    fn new(cmd: &DecodedCommand) -> Self {
        Self {
            start: cmd.start,
            end: cmd.end,
            opcode: cmd.opcode,
            name: cmd.name(),
            class: cmd.class,
            address: None,
            address_width: None,
            payload_address: None,
            payload: None,
            malformed: cmd.truncated,
        }
    }

    /// Number of payload bytes in the frame
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if the opcode is in the table
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }

    fn digits(&self) -> usize {
        self.address_width
            .unwrap_or(AddressWidth::FourByte)
            .hex_digits()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => f.write_str(name)?,
            None => write!(f, "0x{:02X}", self.opcode)?,
        }

        let digits = self.digits();
        if let Some(address) = self.address {
            write!(f, " 0x{:0width$X}", address, width = digits)?;
        }

        if let Some(payload) = self.payload.as_deref() {
            match payload {
                [] => {}
                [only] => write!(f, " (1 byte: {:02X})", only)?,
                [first, .., last] => write!(
                    f,
                    " ({} bytes: {:02X}..{:02X})",
                    payload.len(),
                    first,
                    last
                )?,
            }
            if let (Some(at), Some(address)) = (self.payload_address, self.address) {
                if !payload.is_empty() {
                    if at != address {
                        write!(f, " @ 0x{:0width$X}", at, width = digits)?;
                    }
                    let last = at.wrapping_add(payload.len() as u32 - 1);
                    write!(f, " to 0x{:0width$X}", last, width = digits)?;
                }
            }
        }

        if self.malformed {
            f.write_str(" [malformed]")?;
        }
        Ok(())
    }
}

/// Apply the class and address filters to a decoded command
///
/// Returns at most one frame.
pub fn filter(cmd: &DecodedCommand, tx: &Transaction, config: &FilterConfig) -> Vec<Frame> {
    if !config.classes.allows(cmd.class) {
        log::trace!("Suppressing {:?} command 0x{:02X}", cmd.class, cmd.opcode);
        return Vec::new();
    }

    let level = config.decode_level;
    if level.errors_only() && !cmd.truncated {
        return Vec::new();
    }

    let mut frame = Frame::new(cmd);
    if !level.shows_address() {
        return vec![frame];
    }

    // Unknown opcodes: everything after the opcode byte
    if !cmd.is_known() {
        if level.shows_payload() {
            frame.payload = Some(tx.mosi.get(1..).unwrap_or(&[]).to_vec());
        }
        return vec![frame];
    }

    frame.address = cmd.address;
    frame.address_width = cmd.address_width;

    let payload = cmd.payload_bytes(tx);
    let mut window = 0..payload.len();

    if let (Some(address), Some((min, max))) = (cmd.address, config.address_range()) {
        let first = u64::from(address);
        let last = first + (payload.len() as u64).saturating_sub(1);
        if last < u64::from(min) || first > u64::from(max) {
            log::trace!(
                "Suppressing 0x{:02X} at 0x{:08X}: outside 0x{:08X}..=0x{:08X}",
                cmd.opcode,
                address,
                min,
                max
            );
            return Vec::new();
        }
        let lo = first.max(u64::from(min));
        let hi = last.min(u64::from(max));
        if !payload.is_empty() {
            window = (lo - first) as usize..(hi - first) as usize + 1;
        }
    }

    if level.shows_payload() && cmd.direction.is_some() {
        let clipped = payload.get(window.clone()).unwrap_or(&[]);
        frame.payload = Some(clipped.to_vec());
        frame.payload_address = cmd
            .address
            .map(|address| address.wrapping_add(window.start as u32));
    }

    vec![frame]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::CommandClasses;
    use crate::config::DecodeLevel;
    use crate::decoder::decode;
    use crate::spi::opcodes::*;
    use alloc::string::ToString;

    fn windowed() -> FilterConfig {
        FilterConfig::new()
            .with_min_address(0x1000)
            .with_max_address(0x1FFF)
    }

    fn run(tx: &Transaction, config: &FilterConfig) -> Vec<Frame> {
        filter(&decode(tx, config), tx, config)
    }

    fn read(address: u32, data: &[u8]) -> Transaction {
        let mut mosi = vec![READ, (address >> 16) as u8, (address >> 8) as u8, address as u8];
        let mut miso = vec![0; 4];
        mosi.extend(core::iter::repeat(0).take(data.len()));
        miso.extend_from_slice(data);
        Transaction::from_lines(0, 100, &mosi, &miso)
    }

    #[test]
    fn test_read_label() {
        let tx = read(0x10, &[0xAA, 0xBB]);
        let frames = run(&tx, &FilterConfig::new());
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.name, Some("Read"));
        assert_eq!(frame.address, Some(0x000010));
        assert_eq!(frame.payload.as_deref(), Some(&[0xAA, 0xBB][..]));
        assert_eq!(frame.to_string(), "Read 0x000010 (2 bytes: AA..BB) to 0x000011");
    }

    #[test]
    fn test_read_below_min_suppressed() {
        let tx = read(0x10, &[0xAA, 0xBB]);
        let config = FilterConfig::new().with_min_address(0x20);
        assert!(run(&tx, &config).is_empty());
    }

    #[test]
    fn test_read_inside_window() {
        let tx = read(0x1500, &[]);
        let frames = run(&tx, &windowed());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address, Some(0x1500));
        assert_eq!(frames[0].payload_len(), 0);
        assert_eq!(frames[0].to_string(), "Read 0x001500");
    }

    #[test]
    fn test_read_after_window_suppressed() {
        let tx = read(0x2000, &[0x01]);
        assert!(run(&tx, &windowed()).is_empty());
    }

    #[test]
    fn test_program_clipped_to_window() {
        let mut mosi = vec![PP, 0x00, 0x1F, 0xF0];
        mosi.extend(0..0x30u8);
        let tx = Transaction::from_mosi(0, 100, &mosi);
        let frames = run(&tx, &windowed());
        assert_eq!(frames.len(), 1);
        let payload = frames[0].payload.as_deref().unwrap();
        assert_eq!(payload.len(), 16);
        assert_eq!(payload, &(0..16u8).collect::<Vec<_>>()[..]);
        assert_eq!(frames[0].payload_address, Some(0x1FF0));
    }

    #[test]
    fn test_read_straddling_min_clipped_from_front() {
        let data: Vec<u8> = (0..0x20u8).collect();
        let tx = read(0x0FF0, &data);
        let frames = run(&tx, &windowed());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload_len(), 0x10);
        assert_eq!(frames[0].payload_address, Some(0x1000));
        assert_eq!(
            frames[0].to_string(),
            "Read 0x000FF0 (16 bytes: 10..1F) @ 0x001000 to 0x00100F"
        );
    }

    #[test]
    fn test_unaddressed_commands_pass_window() {
        let tx = Transaction::from_lines(0, 10, &[RDSR, 0x00], &[0xFF, 0x02]);
        let frames = run(&tx, &windowed());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address, None);
        assert_eq!(frames[0].to_string(), "Read Status Register 1 (1 byte: 02)");
    }

    #[test]
    fn test_truncated_address_marked_malformed() {
        let tx = Transaction::from_mosi(0, 10, &[SE_20, 0x00]);
        let frames = run(&tx, &windowed());
        assert_eq!(frames.len(), 1);
        assert!(frames[0].malformed);
        assert!(frames[0].to_string().ends_with("[malformed]"));
    }

    #[test]
    fn test_class_allow_set() {
        let tx = read(0x10, &[0xAA]);
        let classes = CommandClasses::PROGRAM | CommandClasses::ERASE;
        let config = FilterConfig::new().with_classes(classes);
        assert!(run(&tx, &config).is_empty());

        let config = FilterConfig::new().with_classes(CommandClasses::READ);
        assert_eq!(run(&tx, &config).len(), 1);
    }

    #[test]
    fn test_opcode_level_skips_address() {
        let tx = read(0x10, &[0xAA]);
        let config = FilterConfig::new()
            .with_decode_level(DecodeLevel::Opcode)
            .with_min_address(0x20);
        let frames = run(&tx, &config);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address, None);
        assert_eq!(frames[0].to_string(), "Read");
    }

    #[test]
    fn test_address_level_hides_payload() {
        let tx = read(0x10, &[0xAA, 0xBB]);
        let config = FilterConfig::new().with_decode_level(DecodeLevel::Address);
        let frames = run(&tx, &config);
        assert_eq!(frames[0].payload, None);
        assert_eq!(frames[0].to_string(), "Read 0x000010");
    }

    #[test]
    fn test_address_level_keeps_overlapping_span() {
        let data: Vec<u8> = (0..0x20u8).collect();
        let tx = read(0x0FF0, &data);
        let config = windowed().with_decode_level(DecodeLevel::Address);
        let frames = run(&tx, &config);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address, Some(0x0FF0));
        assert_eq!(frames[0].payload, None);
        assert_eq!(frames[0].to_string(), "Read 0x000FF0");
    }

    #[test]
    fn test_errors_level_keeps_only_malformed() {
        let config = FilterConfig::new().with_decode_level(DecodeLevel::Errors);
        assert!(run(&read(0x10, &[0xAA]), &config).is_empty());

        let tx = Transaction::from_mosi(0, 10, &[SE_20, 0x00]);
        let frames = run(&tx, &config);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].malformed);
        assert_eq!(frames[0].address, None);

        let config = config.with_classes(CommandClasses::READ);
        assert!(run(&tx, &config).is_empty());
    }

    #[test]
    fn test_unknown_opcode_label() {
        let tx = Transaction::from_mosi(0, 10, &[0x5E, 0x01]);
        let frames = run(&tx, &FilterConfig::new());
        assert_eq!(frames.len(), 1);
        assert!(!frames[0].is_known());
        assert_eq!(frames[0].class, CommandClass::Other);
        assert_eq!(frames[0].payload.as_deref(), Some(&[0x01][..]));
        assert_eq!(frames[0].to_string(), "0x5E (1 byte: 01)");

        let config = FilterConfig::new().with_decode_level(DecodeLevel::Address);
        let frames = run(&tx, &config);
        assert_eq!(frames[0].payload, None);
        assert_eq!(frames[0].to_string(), "0x5E");
    }

    #[test]
    fn test_address_formatting_follows_width() {
        let tx = Transaction::from_mosi(0, 10, &[SE_21, 0x00, 0x01, 0x00, 0x00]);
        let frames = run(&tx, &FilterConfig::new());
        assert_eq!(frames[0].address_width, Some(AddressWidth::FourByte));
        assert!(frames[0].to_string().ends_with(" 0x00010000"));
    }
}
