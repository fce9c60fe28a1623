use anyhow::{Context, anyhow};
use log::debug;

use petri_algebra::config::PetriConfig;
use petri_algebra::net::{Net, io};
use petri_algebra::open::OpenNet;
use petri_algebra::options::Options;
use petri_algebra::vectorfield;

fn main() -> anyhow::Result<()> {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let options = match Options::parse_from_args(&args) {
        Ok(options) => options,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(err) => err.exit(),
            Err(err) => return Err(anyhow!("{err}")),
        },
    };
    debug!("petri-eval options: {:?}", options);

    let mut config = PetriConfig::load_from_file(&options.config)?;
    options.apply(&mut config);

    let net: Net = if options.open {
        let open: OpenNet = io::read(&options.net)
            .with_context(|| format!("Failed to load open net: {:?}", options.net))?;
        open.into_parts().0
    } else {
        io::read(&options.net).with_context(|| format!("Failed to load net: {:?}", options.net))?
    };

    let f = vectorfield::compile(&net, config.evaluator)?;
    let layout = f.layout();
    let mut u = net
        .initial_state()
        .unwrap_or_else(|_| vec![0.0; layout.len()]);
    for (key, value) in &options.state {
        let slot = layout
            .slot(key)
            .ok_or_else(|| anyhow!("net has no species `{key}`"))?;
        u[slot] = *value;
    }

    let du = f.derivative(&u, &config.parameters, config.time)?;
    let keyed = layout.keyed(&du);
    let out = if config.pretty {
        serde_json::to_string_pretty(&keyed)?
    } else {
        serde_json::to_string(&keyed)?
    };
    println!("{out}");
    Ok(())
}
