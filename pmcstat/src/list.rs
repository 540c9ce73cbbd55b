use pmc::catalog::{self, COUNTER_DEFINITIONS};
use pmc::ProcessorIdentity;

pub fn run() -> anyhow::Result<()> {
    let identity = ProcessorIdentity::host();
    // identity goes to stderr so stdout stays machine-readable
    eprintln!(
        "Detected CPU - vendor: {:?}, model: {:#x}, scheme: {:#x}, family: {:#x}",
        identity.vendor,
        identity.model,
        identity.scheme.bits(),
        identity.family.bits()
    );

    println!("counter_id,name,supported,scheme,family");
    for def in catalog::entries(COUNTER_DEFINITIONS) {
        println!(
            "{},{},{},{:#x},{:#x}",
            def.id,
            def.name,
            def.matches(&identity) as u8,
            def.scheme.bits(),
            def.family.bits()
        );
    }
    Ok(())
}
