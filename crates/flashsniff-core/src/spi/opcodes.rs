//! SPI flash opcodes seen on the bus
//!
//! Command codes follow the JEDEC JESD216 conventions plus the vendor
//! extensions that are common enough to show up in real captures.

// ============================================================================
// Status and configuration registers
// ============================================================================

/// Write Status Register 1
pub const WRSR: u8 = 0x01;
/// Write Disable
pub const WRDI: u8 = 0x04;
/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Write Enable
pub const WREN: u8 = 0x06;
/// Write Status Register 3
pub const WRSR3: u8 = 0x11;
/// Read Status Register 3
pub const RDSR3: u8 = 0x15;
/// Write Status Register 2
pub const WRSR2: u8 = 0x31;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Enable Write Status Register (SST)
pub const EWSR: u8 = 0x50;
/// Write Extended Address Register
pub const WREAR: u8 = 0xC5;
/// Read Extended Address Register
pub const RDEAR: u8 = 0xC8;

// ============================================================================
// Reads
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Fast Read
pub const FAST_READ: u8 = 0x0B;
/// Fast Read, 4-byte address
pub const FAST_READ_4B: u8 = 0x0C;
/// Read Data, 4-byte address
pub const READ_4B: u8 = 0x13;
/// Dual Output Read (1-1-2)
pub const DOR: u8 = 0x3B;
/// Dual Output Read, 4-byte address
pub const DOR_4B: u8 = 0x3C;
/// Quad Output Read (1-1-4)
pub const QOR: u8 = 0x6B;
/// Quad Output Read, 4-byte address
pub const QOR_4B: u8 = 0x6C;
/// Dual I/O Read (1-2-2)
pub const DIOR: u8 = 0xBB;
/// Dual I/O Read, 4-byte address
pub const DIOR_4B: u8 = 0xBC;
/// Quad Word Read (1-4-4, Winbond)
pub const QWR: u8 = 0xE7;
/// Quad I/O Read (1-4-4)
pub const QIOR: u8 = 0xEB;
/// Quad I/O Read, 4-byte address
pub const QIOR_4B: u8 = 0xEC;

// ============================================================================
// Program
// ============================================================================

/// Page Program
pub const PP: u8 = 0x02;
/// Page Program, 4-byte address
pub const PP_4B: u8 = 0x12;
/// Quad Page Program (1-1-4)
pub const QPP: u8 = 0x32;
/// Quad Page Program, 4-byte address
pub const QPP_4B: u8 = 0x34;

// ============================================================================
// Erase
// ============================================================================

/// Sector Erase 4 KiB
pub const SE_20: u8 = 0x20;
/// Sector Erase 4 KiB, 4-byte address
pub const SE_21: u8 = 0x21;
/// Block Erase 32 KiB
pub const BE_52: u8 = 0x52;
/// Block Erase 32 KiB, 4-byte address
pub const BE_5C: u8 = 0x5C;
/// Chip Erase
pub const CE_60: u8 = 0x60;
/// Chip Erase (alternate opcode)
pub const CE_C7: u8 = 0xC7;
/// Block Erase 64 KiB
pub const BE_D8: u8 = 0xD8;
/// Block Erase 64 KiB, 4-byte address
pub const BE_DC: u8 = 0xDC;

// ============================================================================
// Identification and security
// ============================================================================

/// Program Security Register
pub const PRSR: u8 = 0x42;
/// Erase Security Register
pub const ERSR: u8 = 0x44;
/// Read Security Register
pub const RDSCUR: u8 = 0x48;
/// Read Unique ID
pub const RDUID: u8 = 0x4B;
/// Read SFDP
pub const RDSFDP: u8 = 0x5A;
/// Read Electronic Manufacturer & Device ID
pub const REMS: u8 = 0x90;
/// Read JEDEC ID (Micron alias)
pub const RDID_9E: u8 = 0x9E;
/// Read JEDEC ID
pub const RDID: u8 = 0x9F;
/// Release from Deep Power-down / Read Electronic Signature
pub const RES: u8 = 0xAB;

// ============================================================================
// Reset, power and mode control
// ============================================================================

/// Reset Enable
pub const RSTEN: u8 = 0x66;
/// Erase/Program Suspend
pub const SUSPEND: u8 = 0x75;
/// Erase/Program Resume
pub const RESUME: u8 = 0x7A;
/// Reset Device
pub const RST: u8 = 0x99;
/// Enter 4-Byte Address Mode
pub const EN4B: u8 = 0xB7;
/// Deep Power-down
pub const DP: u8 = 0xB9;
/// Exit 4-Byte Address Mode
pub const EX4B: u8 = 0xE9;

// ============================================================================
// Continuous read mode byte
// ============================================================================

/// Mask selecting the part of the mode byte that requests continuous read
pub const MODE_CONTINUOUS_MASK: u8 = 0xF0;
/// Mode byte pattern that keeps the flash in continuous read mode
///
/// Flashes document "nibbles are complements" (0xA5), but only the high
/// nibble is checked since some parts accept any low nibble.
pub const MODE_CONTINUOUS: u8 = 0xA0;

/// Returns true if `mode` keeps the flash in continuous (XIP) read mode
pub const fn is_continuous_mode(mode: u8) -> bool {
    mode & MODE_CONTINUOUS_MASK == MODE_CONTINUOUS
}
