use super::traits::{TextFormat, content_lines};
use super::{LoadError, ParseError};
use crate::core::materials::elements::{parse_element, standard_mass, symbol};
use crate::core::materials::{Element, Material};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Reads and calculates a material description.
///
/// ```text
/// # polyethylene
/// name        CH2
/// density     0.93
/// molar_mass  14.027     # optional
/// energy_loss on         # optional
/// elements 2
/// C  12.011 1
/// 1  1.008  2            # Z or symbol, A, count per molecule
/// ```
pub fn read_material_file(path: &Path) -> Result<Material, LoadError> {
    Material::read_from_path(path)
}

fn parse_f64(token: Option<&str>, line: usize, what: &str) -> Result<f64, ParseError> {
    let token = token.ok_or_else(|| ParseError::syntax(line, format!("missing {what}")))?;
    token
        .parse::<f64>()
        .map_err(|_| ParseError::syntax(line, format!("invalid {what} '{token}'")))
}

fn parse_element_line(line: usize, content: &str) -> Result<Element, ParseError> {
    let mut tokens = content.split_whitespace();
    let z_token = tokens
        .next()
        .ok_or_else(|| ParseError::syntax(line, "missing element"))?;
    let z = parse_element(z_token)
        .ok_or_else(|| ParseError::syntax(line, format!("unknown element '{z_token}'")))?;
    let a = match tokens.next() {
        Some("-") => standard_mass(z).unwrap_or(0.0),
        token => parse_f64(token, line, "atomic mass")?,
    };
    let count_token = tokens
        .next()
        .ok_or_else(|| ParseError::syntax(line, "missing element count"))?;
    let count = count_token
        .parse::<u32>()
        .map_err(|_| ParseError::syntax(line, format!("invalid element count '{count_token}'")))?;
    Ok(Element::new(f64::from(z), a, count))
}

impl TextFormat for Material {
    fn read_from(reader: &mut impl BufRead) -> Result<Self, ParseError> {
        let mut name = String::new();
        let mut density = None;
        let mut molar_mass = None;
        let mut use_eloss = true;
        let mut expected: Option<(usize, usize)> = None;
        let mut elements = Vec::new();
        let mut last_line = 0;

        for entry in content_lines(reader) {
            let (line, content) = entry?;
            last_line = line;

            if let Some((_, count)) = expected {
                if elements.len() < count {
                    elements.push(parse_element_line(line, &content)?);
                    continue;
                }
            }

            let (keyword, rest) = content
                .split_once(char::is_whitespace)
                .map_or((content.as_str(), ""), |(k, r)| (k, r.trim()));
            match keyword.to_ascii_lowercase().as_str() {
                "name" => name = rest.to_string(),
                "density" => density = Some(parse_f64(Some(rest), line, "density")?),
                "molar_mass" => molar_mass = Some(parse_f64(Some(rest), line, "molar mass")?),
                "energy_loss" => {
                    use_eloss = match rest.to_ascii_lowercase().as_str() {
                        "on" | "true" | "yes" => true,
                        "off" | "false" | "no" => false,
                        other => {
                            return Err(ParseError::syntax(
                                line,
                                format!("invalid energy_loss switch '{other}'"),
                            ));
                        }
                    }
                }
                "elements" => {
                    if expected.is_some() {
                        return Err(ParseError::syntax(line, "duplicate elements block"));
                    }
                    let count = rest.parse::<usize>().map_err(|_| {
                        ParseError::syntax(line, format!("invalid element count '{rest}'"))
                    })?;
                    expected = Some((line, count));
                }
                other => {
                    return Err(ParseError::syntax(line, format!("unknown keyword '{other}'")));
                }
            }
        }

        let Some((elements_line, count)) = expected else {
            return Err(ParseError::syntax(last_line, "missing elements block"));
        };
        if elements.len() < count {
            return Err(ParseError::syntax(
                elements_line,
                format!("expected {count} element lines, found {}", elements.len()),
            ));
        }
        let density =
            density.ok_or_else(|| ParseError::syntax(last_line, "missing density"))?;

        let mut material = Material::new(&name);
        material.init(count)?;
        material.set_element_list(&elements)?;
        material.set_density(density)?;
        if let Some(molar_mass) = molar_mass {
            material.set_molar_mass(molar_mass)?;
        }
        material.set_use_eloss(use_eloss);
        material.calculate()?;
        Ok(material)
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "name {}", self.name())?;
        writeln!(writer, "density {}", self.density())?;
        if self.molar_mass() > 0.0 {
            writeln!(writer, "molar_mass {}", self.molar_mass())?;
        }
        if !self.use_eloss() {
            writeln!(writer, "energy_loss off")?;
        }
        writeln!(writer, "elements {}", self.elements().len())?;
        for element in self.elements() {
            let z = element.z.round();
            let label = (1.0..=92.0)
                .contains(&z)
                .then(|| symbol(z as u8))
                .flatten()
                .map_or_else(|| element.z.to_string(), str::to_string);
            writeln!(writer, "{label} {} {}", element.a, element.count)?;
        }
        Ok(())
    }
}
