use hdl::IrataDecl;
use sim::Machine;

fn setup_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Trace } else { log::LevelFilter::Info };
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.target(), record.level(), message))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply();
    if let Err(e) = result {
        eprintln!("logging setup failed: {}", e);
    }
}

/// Compiles the microcode and dumps the instruction memory image.
fn dump_ucode() -> Result<(), String> {
    let irata = IrataDecl::build();
    let table = ucode::compile_irata(&irata).map_err(|e| e.to_string())?;
    let memory = sim::InstructionMemory::build(&irata.topology, &table)
        .map_err(|e| e.to_string())?;
    println!(
        "{} entries, {} address bits",
        memory.len(),
        memory.encoder().num_address_bits()
    );
    for (address, word) in memory.iter() {
        let (opcode, _, step_index) = memory.encoder().decode_address(address);
        let name = common::instruction_by_opcode(opcode)
            .map(|i| i.name)
            .unwrap_or("?");
        println!("0x{:04x}: 0x{:08x}  {} step {}", address, word, name, step_index);
    }
    Ok(())
}

/// Runs a small countdown demo and prints the machine state.
fn run_demo() -> Result<(), String> {
    let irata = IrataDecl::build();
    let table = ucode::compile_irata(&irata).map_err(|e| e.to_string())?;
    let mut machine = Machine::new(&irata, &table).map_err(|e| e.to_string())?;
    // lda #$2a; sta $0020; ldx #$03; loop: dex; jne loop; hlt
    machine.load(
        0x0000,
        &[0x10, 0x2a, 0x12, 0x00, 0x20, 0x13, 0x03, 0x17, 0x22, 0x00, 0x07, 0x01],
    );
    let cycles = machine.run(10_000).map_err(|e| e.to_string())?;
    println!("halted={} after {} cycles", machine.halted(), cycles);
    println!(
        "a=0x{:02x} x=0x{:02x} y=0x{:02x} pc=0x{:04x} status=0x{:02x}",
        machine.a(),
        machine.x(),
        machine.y(),
        machine.pc(),
        machine.status()
    );
    println!("memory[0x0020]=0x{:02x}", machine.memory().get(0x0020));
    Ok(())
}

fn main() {
    let args: Vec<_> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "-v");
    setup_logging(verbose);
    let result = match args.get(1).map(|s| s.as_str()) {
        Some("ucode") => dump_ucode(),
        Some("run") => run_demo(),
        Some(unknown) if unknown != "-v" => Err(format!("unknown arg '{}'", unknown)),
        _ => Err("usage: app <ucode|run> [-v]".to_string()),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
