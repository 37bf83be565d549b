//! List commands implementation

use flashsniff_core::{AddressField, CommandClass, CommandDescriptor, Direction, OPCODE_TABLE};

/// List all known opcodes, optionally only one class
pub fn list_opcodes(class_filter: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let class = class_filter.map(CommandClass::from_name).transpose()?;

    println!("Known flash commands:");
    println!();
    println!(
        "{:<6} {:<34} {:<8} {:<7} {:<5} {:>5} {:<4}",
        "Opcode", "Name", "Class", "Address", "I/O", "Dummy", "Data"
    );
    println!("{}", "-".repeat(75));

    for desc in OPCODE_TABLE {
        if class.is_some_and(|class| class != desc.class) {
            continue;
        }
        println!(
            "0x{:02X}   {:<34} {:<8} {:<7} {:<5} {:>5} {:<4}",
            desc.opcode,
            desc.name,
            desc.class.name(),
            format_address(desc),
            desc.io_mode.notation(),
            desc.dummy_cycles,
            format_payload(desc)
        );
    }

    Ok(())
}

fn format_address(desc: &CommandDescriptor) -> String {
    let address = match desc.address {
        AddressField::None => return "-".to_string(),
        AddressField::Configured => "cfg".to_string(),
        AddressField::Fixed(width) => format!("{}B", width.bytes()),
    };
    if desc.mode_byte {
        format!("{}+M", address)
    } else {
        address
    }
}

fn format_payload(desc: &CommandDescriptor) -> &'static str {
    match desc.payload {
        Some(Direction::DeviceToHost) => "in",
        Some(Direction::HostToDevice) => "out",
        None => "-",
    }
}
