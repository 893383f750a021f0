use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    AuditActionType, AuditEntryEntity, CountryStateEntity, LockerStateEntity,
};

/// Fixed `_id` of the locker singleton document.
pub const LOCKER_DOC_ID: &str = "global";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoLockerDocument {
    #[serde(rename = "_id")]
    #[allow(dead_code)]
    id: String,
    energy_percentage: i32,
    is_unlocked: bool,
    last_updated: DateTime,
}

impl From<MongoLockerDocument> for LockerStateEntity {
    fn from(value: MongoLockerDocument) -> Self {
        Self {
            energy_percentage: value.energy_percentage,
            is_unlocked: value.is_unlocked,
            last_updated: value.last_updated.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCountryDocument {
    #[serde(rename = "_id")]
    country_code: String,
    activation_count: i64,
    glow_band: i32,
    last_updated: DateTime,
}

impl From<MongoCountryDocument> for CountryStateEntity {
    fn from(value: MongoCountryDocument) -> Self {
        Self {
            country_code: value.country_code,
            activation_count: value.activation_count,
            glow_band: value.glow_band,
            last_updated: value.last_updated.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAuditDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    admin_email: String,
    action_type: AuditActionType,
    subject: String,
    delta_or_value: String,
    note: Option<String>,
    recorded_at: DateTime,
}

impl From<AuditEntryEntity> for MongoAuditDocument {
    fn from(value: AuditEntryEntity) -> Self {
        Self {
            id: value.id,
            admin_email: value.admin_email,
            action_type: value.action_type,
            subject: value.subject,
            delta_or_value: value.delta_or_value,
            note: value.note,
            recorded_at: DateTime::from_system_time(value.recorded_at),
        }
    }
}

impl From<MongoAuditDocument> for AuditEntryEntity {
    fn from(value: MongoAuditDocument) -> Self {
        Self {
            id: value.id,
            admin_email: value.admin_email,
            action_type: value.action_type,
            subject: value.subject,
            delta_or_value: value.delta_or_value,
            note: value.note,
            recorded_at: value.recorded_at.to_system_time(),
        }
    }
}
