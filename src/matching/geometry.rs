/// Great-circle separation between two sky positions, all in degrees.
///
/// Uses the Vincenty form, which stays accurate both for tiny separations
/// (where the arccos form loses precision) and for near-antipodal points.
#[must_use]
pub fn angular_separation_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (sin_d1, cos_d1) = dec1.to_radians().sin_cos();
    let (sin_d2, cos_d2) = dec2.to_radians().sin_cos();
    let (sin_dra, cos_dra) = (ra2 - ra1).to_radians().sin_cos();

    let y = (cos_d2 * sin_dra).hypot(cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_dra);
    let x = sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_dra;
    y.atan2(x).to_degrees()
}

/// Comoving transverse distance (Mpc) subtended by `separation_deg` at a
/// comoving transverse distance `d_m` (Mpc) along the line of sight.
///
/// `d_m` is `Cosmology::comoving_transverse_distance` at the halo redshift;
/// it is taken precomputed so callers can evaluate it once per halo.
#[must_use]
pub fn transverse_distance_mpc(d_m: f64, separation_deg: f64) -> f64 {
    d_m * separation_deg.to_radians()
}
