/// Electron rest mass energy (MeV).
pub const ELECTRON_RME: f64 = 0.510_998_95;
/// Proton rest mass energy (MeV).
pub const PROTON_RME: f64 = 938.272_088;
/// Neutron rest mass energy (MeV).
pub const NEUTRON_RME: f64 = 939.565_42;
/// Energy equivalent of one atomic mass unit (MeV).
pub const AMU_TO_MEV: f64 = 931.494_102;

/// Classical electron radius (m).
pub const ELECTRON_RADIUS: f64 = 2.817_940_326_2e-15;
pub const AVOGADRO: f64 = 6.022_140_76e23;
/// Speed of light (m/s).
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;
pub const MEV_TO_JOULE: f64 = 1.602_176_634e-13;
pub const MILLIBARN_TO_CM2: f64 = 1e-27;

/// `2π r_e² m_e c²` in MeV·m².
pub const BETHE_COEFFICIENT: f64 =
    2.0 * std::f64::consts::PI * ELECTRON_RADIUS * ELECTRON_RADIUS * ELECTRON_RME;

/// Mean excitation energies (eV) for Z = 1..=13. Heavier elements use the
/// Bloch approximation.
pub const IONIZATION_POTENTIALS_EV: [f64; 13] = [
    19.2, 41.8, 40.0, 63.7, 76.0, 78.0, 82.0, 95.0, 115.0, 137.0, 149.0, 156.0, 166.0,
];

// Shell correction polynomial coefficients (I in eV, η = βγ).
pub(crate) const SHELL_A: [f64; 3] = [0.422_377, 0.030_404_3, -0.000_381_06];
pub(crate) const SHELL_B: [f64; 3] = [3.858_019, -0.166_798_9, 0.001_579_55];

/// Mean excitation energy (eV) of a neutral atom with atomic number `z`.
pub fn ionization_potential_ev(z: f64) -> f64 {
    let index = z.round();
    if (1.0..=13.0).contains(&index) && (z - index).abs() < 1e-9 {
        IONIZATION_POTENTIALS_EV[index as usize - 1]
    } else {
        9.76 * z + 58.8 * z.powf(-0.19)
    }
}
