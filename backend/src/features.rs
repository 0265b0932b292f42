use serde::{Deserialize, Serialize};

/// Vehicle and battery state for one request. Field names on the wire match
/// the schema the regression model was trained against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    #[serde(rename = "Battery_Capacity_kWh")]
    pub battery_capacity_kwh: f64,
    #[serde(rename = "Vehicle_Age_Months")]
    pub vehicle_age_months: u32,
    #[serde(rename = "Total_Charging_Cycles")]
    pub total_charging_cycles: u32,
    #[serde(rename = "Avg_Temperature_C")]
    pub avg_temperature_c: f64,
    #[serde(rename = "Fast_Charge_Ratio")]
    pub fast_charge_ratio: f64,
    #[serde(rename = "Avg_Discharge_Rate_C")]
    pub avg_discharge_rate_c: f64,
    #[serde(rename = "Internal_Resistance_Ohm")]
    pub internal_resistance_ohm: f64,
    #[serde(rename = "SoH_Percent")]
    pub soh_percent: Option<f64>,
    #[serde(rename = "Car_Model_Ford_Mustang_Mach_E", default)]
    pub car_model_ford_mustang_mach_e: u8,
    #[serde(rename = "Car_Model_Hyundai_Ioniq_5", default)]
    pub car_model_hyundai_ioniq_5: u8,
    #[serde(rename = "Car_Model_Tesla_Model_3", default)]
    pub car_model_tesla_model_3: u8,
    #[serde(rename = "Car_Model_Wuling_Air_EV", default)]
    pub car_model_wuling_air_ev: u8,
    #[serde(rename = "Battery_Type_NMC", default)]
    pub battery_type_nmc: u8,
    #[serde(rename = "Driving_Style_Conservative", default)]
    pub driving_style_conservative: u8,
    #[serde(rename = "Driving_Style_Moderate", default)]
    pub driving_style_moderate: u8,
    #[serde(rename = "Battery_Status_Replace_Required", default)]
    pub battery_status_replace_required: u8,
    #[serde(rename = "Vehicle_Weight_kg")]
    pub vehicle_weight_kg: f64,
    #[serde(rename = "Drag_Coefficient")]
    pub drag_coefficient: f64,
    #[serde(rename = "Frontal_Area_m2")]
    pub frontal_area_m2: f64,
    #[serde(rename = "Rolling_Resistance_Coeff")]
    pub rolling_resistance_coeff: f64,
    #[serde(rename = "Motor_Efficiency")]
    pub motor_efficiency: f64,
}

/// Trip-level dynamics. Caller-supplied on plain predictions; derived per
/// candidate during route optimization, overriding the request's values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripDynamics {
    #[serde(rename = "Trip_Distance_km")]
    pub distance_km: f64,
    #[serde(rename = "Elevation_Gain_m")]
    pub elevation_gain_m: f64,
    #[serde(rename = "Traffic_Index")]
    pub traffic_index: f64,
    #[serde(rename = "Avg_Speed_kmph")]
    pub avg_speed_kmph: f64,
    #[serde(rename = "Humidity_Percent")]
    pub humidity_percent: f64,
    #[serde(rename = "Wind_Speed_mps")]
    pub wind_speed_mps: f64,
}

/// Body of `POST /api/v1/predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub vehicle: VehicleState,
    #[serde(flatten)]
    pub trip: TripDynamics,
}

/// Body of `POST /api/v1/optimize-route`: a predict request plus two
/// location strings, each either literal `"lat,lon"` or a geocodable name.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    #[serde(flatten)]
    pub vehicle: VehicleState,
    #[serde(flatten)]
    pub trip: TripDynamics,
    pub start_location: String,
    pub end_location: String,
}

/// Training-time column order. The model artifact is validated against this
/// list at load; `FeatureVector::new` fills values in the same order.
pub const FEATURE_COLUMNS: [&str; 30] = [
    "Battery_Capacity_kWh",
    "Vehicle_Age_Months",
    "Total_Charging_Cycles",
    "Avg_Temperature_C",
    "Fast_Charge_Ratio",
    "Avg_Discharge_Rate_C",
    "Internal_Resistance_Ohm",
    "SoH_Percent",
    "Car_Model_Ford Mustang Mach-E",
    "Car_Model_Hyundai Ioniq 5",
    "Car_Model_Tesla Model 3",
    "Car_Model_Wuling Air EV",
    "Battery_Type_NMC",
    "Driving_Style_Conservative",
    "Driving_Style_Moderate",
    "Battery_Status_Replace Required",
    "Vehicle_Weight_kg",
    "Drag_Coefficient",
    "Frontal_Area_m2",
    "Rolling_Resistance_Coeff",
    "Motor_Efficiency",
    "Trip_Distance_km",
    "Elevation_Gain_m",
    "Traffic_Index",
    "Avg_Speed_kmph",
    "Humidity_Percent",
    "Wind_Speed_mps",
    "Energy_Consumed_kWh",
    "Estimated_Range_km",
    "Consumption_kWh_per_km",
];

/// Fixed-order numeric vector the regression model consumes.
///
/// The last three columns are the quantities the model was fit to predict;
/// they are always zero on input and must never carry caller data.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; 30]);

impl FeatureVector {
    pub fn new(vehicle: &VehicleState, trip: &TripDynamics) -> Self {
        Self([
            vehicle.battery_capacity_kwh,
            vehicle.vehicle_age_months as f64,
            vehicle.total_charging_cycles as f64,
            vehicle.avg_temperature_c,
            vehicle.fast_charge_ratio,
            vehicle.avg_discharge_rate_c,
            vehicle.internal_resistance_ohm,
            vehicle.soh_percent.unwrap_or(0.0),
            vehicle.car_model_ford_mustang_mach_e as f64,
            vehicle.car_model_hyundai_ioniq_5 as f64,
            vehicle.car_model_tesla_model_3 as f64,
            vehicle.car_model_wuling_air_ev as f64,
            vehicle.battery_type_nmc as f64,
            vehicle.driving_style_conservative as f64,
            vehicle.driving_style_moderate as f64,
            vehicle.battery_status_replace_required as f64,
            vehicle.vehicle_weight_kg,
            vehicle.drag_coefficient,
            vehicle.frontal_area_m2,
            vehicle.rolling_resistance_coeff,
            vehicle.motor_efficiency,
            trip.distance_km,
            trip.elevation_gain_m,
            trip.traffic_index,
            trip.avg_speed_kmph,
            trip.humidity_percent,
            trip.wind_speed_mps,
            0.0,
            0.0,
            0.0,
        ])
    }

    pub fn as_array(&self) -> &[f64; 30] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vehicle() -> VehicleState {
        VehicleState {
            battery_capacity_kwh: 75.0,
            vehicle_age_months: 12,
            total_charging_cycles: 100,
            avg_temperature_c: 25.0,
            fast_charge_ratio: 0.3,
            avg_discharge_rate_c: 1.0,
            internal_resistance_ohm: 0.05,
            soh_percent: Some(95.0),
            car_model_ford_mustang_mach_e: 0,
            car_model_hyundai_ioniq_5: 0,
            car_model_tesla_model_3: 1,
            car_model_wuling_air_ev: 0,
            battery_type_nmc: 1,
            driving_style_conservative: 1,
            driving_style_moderate: 0,
            battery_status_replace_required: 0,
            vehicle_weight_kg: 1800.0,
            drag_coefficient: 0.25,
            frontal_area_m2: 2.4,
            rolling_resistance_coeff: 0.01,
            motor_efficiency: 0.95,
        }
    }

    fn sample_trip() -> TripDynamics {
        TripDynamics {
            distance_km: 100.0,
            elevation_gain_m: 50.0,
            traffic_index: 5.0,
            avg_speed_kmph: 60.0,
            humidity_percent: 60.0,
            wind_speed_mps: 5.0,
        }
    }

    #[test]
    fn feature_vector_has_exactly_thirty_columns() {
        let vector = FeatureVector::new(&sample_vehicle(), &sample_trip());
        assert_eq!(vector.as_array().len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn feature_vector_order_is_stable_across_calls() {
        let vehicle = sample_vehicle();
        let trip = sample_trip();
        let first = FeatureVector::new(&vehicle, &trip);
        let second = FeatureVector::new(&vehicle, &trip);
        assert_eq!(first, second);
    }

    #[test]
    fn feature_vector_places_fields_at_training_positions() {
        let vector = FeatureVector::new(&sample_vehicle(), &sample_trip());
        let values = vector.as_array();
        assert_eq!(values[0], 75.0); // Battery_Capacity_kWh
        assert_eq!(values[7], 95.0); // SoH_Percent
        assert_eq!(values[10], 1.0); // Car_Model_Tesla Model 3
        assert_eq!(values[21], 100.0); // Trip_Distance_km
        assert_eq!(values[26], 5.0); // Wind_Speed_mps
    }

    #[test]
    fn target_placeholders_are_always_zero() {
        let vector = FeatureVector::new(&sample_vehicle(), &sample_trip());
        let values = vector.as_array();
        assert_eq!(values[27], 0.0);
        assert_eq!(values[28], 0.0);
        assert_eq!(values[29], 0.0);
    }

    #[test]
    fn missing_soh_defaults_to_zero() {
        let mut vehicle = sample_vehicle();
        vehicle.soh_percent = None;
        let vector = FeatureVector::new(&vehicle, &sample_trip());
        assert_eq!(vector.as_array()[7], 0.0);
    }

    #[test]
    fn route_request_parses_flat_training_schema_json() {
        let body = serde_json::json!({
            "Internal_Resistance_Ohm": 0.05,
            "Total_Charging_Cycles": 100,
            "Battery_Capacity_kWh": 75.0,
            "Fast_Charge_Ratio": 0.3,
            "Avg_Temperature_C": 25.0,
            "Vehicle_Age_Months": 12,
            "Avg_Discharge_Rate_C": 1.0,
            "SoH_Percent": 95.0,
            "Car_Model_Tesla_Model_3": 1,
            "Battery_Type_NMC": 1,
            "Driving_Style_Conservative": 1,
            "Vehicle_Weight_kg": 1800.0,
            "Drag_Coefficient": 0.25,
            "Frontal_Area_m2": 2.4,
            "Rolling_Resistance_Coeff": 0.01,
            "Motor_Efficiency": 0.95,
            "Trip_Distance_km": 100.0,
            "Elevation_Gain_m": 50.0,
            "Traffic_Index": 5.0,
            "Avg_Speed_kmph": 60.0,
            "Humidity_Percent": 60.0,
            "Wind_Speed_mps": 5.0,
            "start_location": "12.9,77.6",
            "end_location": "Delhi, India"
        });
        let request: RouteRequest = serde_json::from_value(body).expect("flat request body");
        assert_eq!(request.vehicle.car_model_tesla_model_3, 1);
        assert_eq!(request.vehicle.car_model_wuling_air_ev, 0);
        assert_eq!(request.trip.distance_km, 100.0);
        assert_eq!(request.start_location, "12.9,77.6");
    }
}
