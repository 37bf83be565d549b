//! Opcode table
//!
//! Static description of how each known command is laid out on the bus:
//! which fields follow the opcode, how many lines carry them and whether a
//! data payload comes back from (or goes to) the flash.
//!
//! Dummy phases are given in clock cycles, like the datasheets do. The
//! decoder converts them to transaction bytes depending on how the bytes
//! were packed (see [`CommandDescriptor::dummy_bytes`]).

use crate::class::CommandClass;
use crate::spi::opcodes::*;
use crate::spi::{AddressWidth, IoMode};

/// Address field of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressField {
    /// No address phase
    None,
    /// Address width follows the configured (or tracked) width
    Configured,
    /// Address width is fixed by the opcode (e.g. 4-byte opcodes, SFDP)
    Fixed(AddressWidth),
}

/// Direction of the data payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Flash drives the data (MISO / IO lines as inputs)
    DeviceToHost,
    /// Host drives the data (MOSI / IO lines as outputs)
    HostToDevice,
}

/// Bus layout of a single flash command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandDescriptor {
    /// The opcode byte
    pub opcode: u8,
    /// Human-readable name
    pub name: &'static str,
    /// Command class
    pub class: CommandClass,
    /// Address field layout
    pub address: AddressField,
    /// Line layout of the address and data phases
    pub io_mode: IoMode,
    /// A continuous-read mode byte follows the address
    pub mode_byte: bool,
    /// Dummy clock cycles after the address (and mode byte)
    pub dummy_cycles: u8,
    /// Payload direction, `None` for commands without a data phase
    pub payload: Option<Direction>,
}

impl CommandDescriptor {
    const fn new(opcode: u8, name: &'static str, class: CommandClass) -> Self {
        Self {
            opcode,
            name,
            class,
            address: AddressField::None,
            io_mode: IoMode::Single,
            mode_byte: false,
            dummy_cycles: 0,
            payload: None,
        }
    }

    const fn addressed(mut self) -> Self {
        self.address = AddressField::Configured;
        self
    }

    const fn fixed_address(mut self, width: AddressWidth) -> Self {
        self.address = AddressField::Fixed(width);
        self
    }

    const fn io(mut self, mode: IoMode) -> Self {
        self.io_mode = mode;
        self
    }

    const fn mode(mut self) -> Self {
        self.mode_byte = true;
        self
    }

    const fn dummy(mut self, cycles: u8) -> Self {
        self.dummy_cycles = cycles;
        self
    }

    const fn reads(mut self) -> Self {
        self.payload = Some(Direction::DeviceToHost);
        self
    }

    const fn writes(mut self) -> Self {
        self.payload = Some(Direction::HostToDevice);
        self
    }

    /// Returns true if the command carries an address field
    pub const fn has_address(&self) -> bool {
        !matches!(self.address, AddressField::None)
    }

    /// Returns true if the command has a data phase
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Resolve the address width against the configured width
    pub const fn address_width(&self, configured: AddressWidth) -> Option<AddressWidth> {
        match self.address {
            AddressField::None => None,
            AddressField::Configured => Some(configured),
            AddressField::Fixed(width) => Some(width),
        }
    }

    /// Number of transaction bytes occupied by the dummy phase
    ///
    /// A single-line byte decoder packs 8 clocks into one byte. When the
    /// transaction was reassembled lane-aware from parallel samples, each
    /// dummy clock carries `data_lines` bits instead.
    pub const fn dummy_bytes(&self, multi_io: bool) -> usize {
        let lines = if multi_io {
            self.io_mode.data_lines() as usize
        } else {
            1
        };
        (self.dummy_cycles as usize * lines).div_ceil(8)
    }
}

use CommandClass::{Erase, Id, Other, Program, Read, Reset, Status};

/// All known commands, sorted by opcode
pub static OPCODE_TABLE: &[CommandDescriptor] = &[
    CommandDescriptor::new(WRSR, "Write Status Register 1", Status).writes(),
    CommandDescriptor::new(PP, "Page Program", Program).addressed().writes(),
    CommandDescriptor::new(READ, "Read", Read).addressed().reads(),
    CommandDescriptor::new(WRDI, "Write Disable", Status),
    CommandDescriptor::new(RDSR, "Read Status Register 1", Status).reads(),
    CommandDescriptor::new(WREN, "Write Enable", Status),
    CommandDescriptor::new(FAST_READ, "Fast Read", Read)
        .addressed()
        .dummy(8)
        .reads(),
    CommandDescriptor::new(FAST_READ_4B, "Fast Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(WRSR3, "Write Status Register 3", Status).writes(),
    CommandDescriptor::new(PP_4B, "Page Program 4B", Program)
        .fixed_address(AddressWidth::FourByte)
        .writes(),
    CommandDescriptor::new(READ_4B, "Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .reads(),
    CommandDescriptor::new(RDSR3, "Read Status Register 3", Status).reads(),
    CommandDescriptor::new(SE_20, "Sector Erase 4K", Erase).addressed(),
    CommandDescriptor::new(SE_21, "Sector Erase 4K 4B", Erase)
        .fixed_address(AddressWidth::FourByte),
    CommandDescriptor::new(WRSR2, "Write Status Register 2", Status).writes(),
    CommandDescriptor::new(QPP, "Quad Page Program", Program)
        .addressed()
        .io(IoMode::QuadOut)
        .writes(),
    CommandDescriptor::new(QPP_4B, "Quad Page Program 4B", Program)
        .fixed_address(AddressWidth::FourByte)
        .io(IoMode::QuadOut)
        .writes(),
    CommandDescriptor::new(RDSR2, "Read Status Register 2", Status).reads(),
    CommandDescriptor::new(DOR, "Dual Output Read", Read)
        .addressed()
        .io(IoMode::DualOut)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(DOR_4B, "Dual Output Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .io(IoMode::DualOut)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(PRSR, "Program Security Register", Id)
        .addressed()
        .writes(),
    CommandDescriptor::new(ERSR, "Erase Security Register", Id).addressed(),
    CommandDescriptor::new(RDSCUR, "Read Security Register", Id)
        .addressed()
        .dummy(8)
        .reads(),
    CommandDescriptor::new(RDUID, "Read Unique ID", Id).dummy(32).reads(),
    CommandDescriptor::new(EWSR, "Enable Write Status Register", Status),
    CommandDescriptor::new(BE_52, "Block Erase 32K", Erase).addressed(),
    CommandDescriptor::new(RDSFDP, "Read SFDP", Id)
        .fixed_address(AddressWidth::ThreeByte)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(BE_5C, "Block Erase 32K 4B", Erase)
        .fixed_address(AddressWidth::FourByte),
    CommandDescriptor::new(CE_60, "Chip Erase", Erase),
    CommandDescriptor::new(RSTEN, "Reset Enable", Reset),
    CommandDescriptor::new(QOR, "Quad Output Read", Read)
        .addressed()
        .io(IoMode::QuadOut)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(QOR_4B, "Quad Output Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .io(IoMode::QuadOut)
        .dummy(8)
        .reads(),
    CommandDescriptor::new(SUSPEND, "Program/Erase Suspend", Other),
    CommandDescriptor::new(RESUME, "Program/Erase Resume", Other),
    CommandDescriptor::new(REMS, "Read Manufacturer/Device ID", Id)
        .fixed_address(AddressWidth::ThreeByte)
        .reads(),
    CommandDescriptor::new(RST, "Reset Device", Reset),
    CommandDescriptor::new(RDID_9E, "Read JEDEC ID", Id).reads(),
    CommandDescriptor::new(RDID, "Read JEDEC ID", Id).reads(),
    CommandDescriptor::new(RES, "Release Power-down / Device ID", Id).reads(),
    CommandDescriptor::new(EN4B, "Enter 4-Byte Address Mode", Other),
    CommandDescriptor::new(DP, "Deep Power-down", Other),
    CommandDescriptor::new(DIOR, "Dual I/O Read", Read)
        .addressed()
        .io(IoMode::DualIo)
        .mode()
        .reads(),
    CommandDescriptor::new(DIOR_4B, "Dual I/O Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .io(IoMode::DualIo)
        .mode()
        .reads(),
    CommandDescriptor::new(WREAR, "Write Extended Address Register", Status).writes(),
    CommandDescriptor::new(CE_C7, "Chip Erase", Erase),
    CommandDescriptor::new(RDEAR, "Read Extended Address Register", Status).reads(),
    CommandDescriptor::new(BE_D8, "Block Erase 64K", Erase).addressed(),
    CommandDescriptor::new(BE_DC, "Block Erase 64K 4B", Erase)
        .fixed_address(AddressWidth::FourByte),
    CommandDescriptor::new(QWR, "Quad Word Read", Read)
        .addressed()
        .io(IoMode::QuadIo)
        .mode()
        .dummy(2)
        .reads(),
    CommandDescriptor::new(EX4B, "Exit 4-Byte Address Mode", Other),
    CommandDescriptor::new(QIOR, "Quad I/O Read", Read)
        .addressed()
        .io(IoMode::QuadIo)
        .mode()
        .dummy(4)
        .reads(),
    CommandDescriptor::new(QIOR_4B, "Quad I/O Read 4B", Read)
        .fixed_address(AddressWidth::FourByte)
        .io(IoMode::QuadIo)
        .mode()
        .dummy(4)
        .reads(),
];

/// Look up the descriptor of an opcode
pub fn lookup(opcode: u8) -> Option<&'static CommandDescriptor> {
    OPCODE_TABLE
        .binary_search_by_key(&opcode, |desc| desc.opcode)
        .ok()
        .map(|index| &OPCODE_TABLE[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in OPCODE_TABLE.windows(2) {
            assert!(
                pair[0].opcode < pair[1].opcode,
                "table out of order at 0x{:02X}",
                pair[1].opcode
            );
        }
    }

    #[test]
    fn test_lookup_known() {
        let read = lookup(READ).unwrap();
        assert_eq!(read.name, "Read");
        assert_eq!(read.class, CommandClass::Read);
        assert_eq!(read.address, AddressField::Configured);
        assert_eq!(read.payload, Some(Direction::DeviceToHost));

        let pp = lookup(PP).unwrap();
        assert_eq!(pp.class, CommandClass::Program);
        assert_eq!(pp.payload, Some(Direction::HostToDevice));

        assert!(!lookup(WREN).unwrap().has_address());
        assert!(!lookup(WREN).unwrap().has_payload());
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup(0x00).is_none());
        assert!(lookup(0x5E).is_none());
        assert!(lookup(0xFF).is_none());
    }

    #[test]
    fn test_address_width_override() {
        let read_4b = lookup(READ_4B).unwrap();
        assert_eq!(
            read_4b.address_width(AddressWidth::ThreeByte),
            Some(AddressWidth::FourByte)
        );
        let read = lookup(READ).unwrap();
        assert_eq!(
            read.address_width(AddressWidth::TwoByte),
            Some(AddressWidth::TwoByte)
        );
        let sfdp = lookup(RDSFDP).unwrap();
        assert_eq!(
            sfdp.address_width(AddressWidth::FourByte),
            Some(AddressWidth::ThreeByte)
        );
        assert_eq!(lookup(RDSR).unwrap().address_width(AddressWidth::FourByte), None);
    }

    #[test]
    fn test_dummy_bytes_packing() {
        // 8 dummy clocks: one byte on a single line, four on quad lines
        let qor = lookup(QOR).unwrap();
        assert_eq!(qor.dummy_bytes(false), 1);
        assert_eq!(qor.dummy_bytes(true), 4);

        let fast = lookup(FAST_READ).unwrap();
        assert_eq!(fast.dummy_bytes(false), 1);
        assert_eq!(fast.dummy_bytes(true), 1);

        // 1-4-4: mode byte plus 4 dummy clocks
        let qior = lookup(QIOR).unwrap();
        assert!(qior.mode_byte);
        assert_eq!(qior.dummy_bytes(true), 2);

        let dior = lookup(DIOR).unwrap();
        assert_eq!(dior.dummy_bytes(true), 0);
    }
}
