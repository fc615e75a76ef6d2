use anyhow::{Context, bail};
use liquid_fmt::{config::FormatOptions, format_text, is_liquid_path};
use std::{convert::Infallible, env, fs, io};

fn main() -> anyhow::Result<()> {
    let Some(file_path) = env::args().nth(1) else {
        bail!("usage: fmt <file.liquid>");
    };
    if !is_liquid_path(&file_path) {
        bail!("'{file_path}' is not a Liquid template");
    }
    let code = fs::read_to_string(&file_path).with_context(|| format!("failed to read '{file_path}'"))?;
    let options = match fs::read_to_string("liquid_fmt.toml") {
        Ok(s) => toml::from_str(&s)?,
        Err(error) => {
            if error.kind() == io::ErrorKind::NotFound {
                FormatOptions::default()
            } else {
                return Err(error.into());
            }
        }
    };

    let formatted = match format_text(&code, &options, |code, _| {
        Ok::<_, Infallible>(code.into())
    }) {
        Ok(formatted) => formatted,
        Err(liquid_fmt::FormatError::Syntax(error)) => {
            bail!("{}", error.diagnostic(&code))
        }
        Err(error) => return Err(error.into()),
    };
    print!("{formatted}");
    Ok(())
}
