use crate::models::delivery::Coordinates;

const EARTH_RADIUS_KM: f64 = 6_371.0;

// Average urban courier speed used for ETA estimates.
const COURIER_SPEED_KMH: f64 = 25.0;

pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat_from = from.lat.to_radians();
    let lat_to = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat_from.cos() * lat_to.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

pub fn estimate_eta(distance_km: f64) -> String {
    let minutes = ((distance_km.max(0.0) / COURIER_SPEED_KMH) * 60.0).ceil().max(1.0) as u64;
    format!("{minutes} min")
}
