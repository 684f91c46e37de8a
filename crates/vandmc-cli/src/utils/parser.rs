use nalgebra::Vector3;
use thiserror::Error;
use vandmc::core::materials::elements::{atomic_number, symbol};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Invalid particle '{0}'. Expected a light particle (n, p, d, t, 3He, alpha) or 'A' followed by an element symbol (e.g., '12C')."
    )]
    InvalidParticle(String),

    #[error("Unknown element symbol '{symbol}' in particle '{name}'.")]
    UnknownElement { symbol: String, name: String },

    #[error("Invalid vector '{0}'. Expected three comma-separated numbers (e.g., '0,0,1.5').")]
    InvalidVector(String),
}

/// A particle named on the command line or in a configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpec {
    pub name: String,
    pub z: u8,
    pub a: u16,
    /// Nuclear mass (u), known for the light particles.
    pub mass_amu: Option<f64>,
}

const LIGHT_PARTICLES: [(&str, &[&str], u8, u16, f64); 6] = [
    ("n", &["n", "neutron"], 0, 1, 1.008_664_916),
    ("p", &["p", "proton", "1h"], 1, 1, 1.007_276_467),
    ("d", &["d", "deuteron", "2h"], 1, 2, 2.013_553_213),
    ("t", &["t", "triton", "3h"], 1, 3, 3.015_500_716),
    ("3He", &["3he", "helion"], 2, 3, 3.014_932_247),
    ("alpha", &["alpha", "a", "4he"], 2, 4, 4.001_506_179),
];

/// Parses `n`, `p`, `d`, `t`, `3He`, `alpha` or a mass number followed by an
/// element symbol such as `13N`.
pub fn parse_particle(spec: &str) -> Result<ParticleSpec, ParseError> {
    let trimmed = spec.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(&(name, _, z, a, mass)) = LIGHT_PARTICLES
        .iter()
        .find(|(_, aliases, ..)| aliases.contains(&lower.as_str()))
    {
        return Ok(ParticleSpec {
            name: name.to_string(),
            z,
            a,
            mass_amu: Some(mass),
        });
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| ParseError::InvalidParticle(spec.to_string()))?;
    let (mass_number, element) = trimmed.split_at(split);
    let a = mass_number
        .parse::<u16>()
        .ok()
        .filter(|&a| a > 0)
        .ok_or_else(|| ParseError::InvalidParticle(spec.to_string()))?;
    let z = atomic_number(element).ok_or_else(|| ParseError::UnknownElement {
        symbol: element.to_string(),
        name: spec.to_string(),
    })?;
    if u16::from(z) > a {
        return Err(ParseError::InvalidParticle(spec.to_string()));
    }
    Ok(ParticleSpec {
        name: format!("{a}{}", symbol(z).unwrap_or(element)),
        z,
        a,
        mass_amu: None,
    })
}

/// Parses `x,y,z`.
pub fn parse_vector(text: &str) -> Result<Vector3<f64>, ParseError> {
    let values: Vec<f64> = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| ParseError::InvalidVector(text.to_string()))?;
    match values.as_slice() {
        &[x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(ParseError::InvalidVector(text.to_string())),
    }
}
