//! Charge-cost estimation against the fixed EV model table.

use serde::{Deserialize, Serialize};

use crate::engine::{effective_price, CHARGING_POWER_KW};
use crate::models::Station;
use crate::EngineError;

/// A vehicle entry in the fixed model table.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvModel {
    pub key: &'static str,
    pub display_name: &'static str,
    /// Usable battery capacity in kWh.
    pub battery_kwh: f64,
}

/// The fixed EV model table. User profiles reference entries by `key`.
pub const EV_MODELS: &[EvModel] = &[
    EvModel { key: "tesla-model-3", display_name: "Tesla Model 3", battery_kwh: 57.5 },
    EvModel { key: "tesla-model-y", display_name: "Tesla Model Y", battery_kwh: 75.0 },
    EvModel { key: "nissan-leaf", display_name: "Nissan Leaf", battery_kwh: 39.0 },
    EvModel { key: "hyundai-kona", display_name: "Hyundai Kona Electric", battery_kwh: 64.0 },
    EvModel { key: "kia-ev6", display_name: "Kia EV6", battery_kwh: 77.4 },
    EvModel { key: "vw-id4", display_name: "Volkswagen ID.4", battery_kwh: 77.0 },
    EvModel { key: "renault-zoe", display_name: "Renault Zoe", battery_kwh: 52.0 },
];

pub fn ev_model(key: &str) -> Option<&'static EvModel> {
    EV_MODELS.iter().find(|m| m.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeEstimate {
    pub kwh: f64,
    pub cost: f64,
    /// Hours at the fixed charging rate.
    pub hours: f64,
}

/// Estimate the energy, cost, and time to charge `model` from `current_soc`
/// to `target_soc` percent at `station`, at the station's effective price.
pub fn estimate_charge(
    model_key: &str,
    current_soc: u8,
    target_soc: u8,
    station: &Station,
) -> Result<ChargeEstimate, EngineError> {
    let model = ev_model(model_key).ok_or_else(|| EngineError::UnknownVehicle {
        model: model_key.to_string(),
    })?;
    if target_soc <= current_soc || target_soc > 100 {
        return Err(EngineError::InvalidChargeTarget {
            current_soc,
            target_soc,
        });
    }
    let kwh = (target_soc - current_soc) as f64 / 100.0 * model.battery_kwh;
    Ok(ChargeEstimate {
        kwh,
        cost: kwh * effective_price(station),
        hours: kwh / CHARGING_POWER_KW,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{SlotCounts, StationStatus};

    fn test_station(price: f64, peak: Option<f64>) -> Station {
        Station {
            id: uuid::Uuid::new_v4(),
            name: "Harbour Point".into(),
            city: "Nantes".into(),
            lat: 47.21,
            lng: -1.55,
            slots: SlotCounts { total: 6, available: 6 },
            queue: Vec::new(),
            price_per_kwh: price,
            current_price: peak,
            status: StationStatus::Operational,
            images: Vec::new(),
            amenities: Vec::new(),
            charger_types: vec!["Type 2".into()],
            mobile: "+33200000000".into(),
        }
    }

    #[test]
    fn estimates_energy_cost_and_duration() {
        let station = test_station(0.50, None);
        let est = estimate_charge("nissan-leaf", 20, 80, &station).unwrap();
        // 60% of 39 kWh
        assert!((est.kwh - 23.4).abs() < 1e-9);
        assert!((est.cost - 23.4 * 0.50).abs() < 1e-9);
        assert!((est.hours - 23.4 / 25.0).abs() < 1e-9);
    }

    #[test]
    fn estimate_uses_peak_price_when_in_effect() {
        let station = test_station(0.50, Some(0.65));
        let est = estimate_charge("tesla-model-3", 50, 100, &station).unwrap();
        assert!((est.cost - est.kwh * 0.65).abs() < 1e-9);
    }

    #[test]
    fn rejects_target_not_above_current() {
        let station = test_station(0.50, None);
        for (current, target) in [(80, 80), (80, 20), (50, 101)] {
            let err = estimate_charge("kia-ev6", current, target, &station).unwrap_err();
            assert!(matches!(err, EngineError::InvalidChargeTarget { .. }));
        }
    }

    #[test]
    fn rejects_unknown_vehicle_model() {
        let station = test_station(0.50, None);
        let err = estimate_charge("delorean-dmc12", 10, 90, &station).unwrap_err();
        assert!(matches!(err, EngineError::UnknownVehicle { .. }));
    }
}
