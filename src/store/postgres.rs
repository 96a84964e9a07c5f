use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::ops::Bound;

use super::{
    FixedValuePort, GroupKey, MeasurementStore, MeterPort, MeterRef, StoreError, TimeRange,
    VirtualEnergyPort, TEMPERATURE_RESOURCE,
};
use crate::engine::types::{MeterKind, Sample, SampleGroup, TemperatureReading, Unit};

const METER_PORT_SELECT: &str = r#"
    SELECT
        p.id::bigint AS id,
        p.name,
        p.resource_type,
        p.unit,
        mm.id::bigint AS mainmeter_id,
        mm.name AS mainmeter_name,
        mm.residential_home_id::bigint AS mainmeter_home_id,
        sm.id::bigint AS submeter_id,
        sm.name AS submeter_name,
        sm.residential_home_id::bigint AS submeter_home_id
    FROM homes_meterport p
    LEFT JOIN homes_mainmeter mm ON mm.id = p.mainmeter_id
    LEFT JOIN homes_submeter sm ON sm.id = p.submeter_id
"#;

#[derive(FromRow)]
struct MeterPortRow {
    id: i64,
    name: String,
    resource_type: String,
    unit: String,
    mainmeter_id: Option<i64>,
    mainmeter_name: Option<String>,
    mainmeter_home_id: Option<i64>,
    submeter_id: Option<i64>,
    submeter_name: Option<String>,
    submeter_home_id: Option<i64>,
}

impl TryFrom<MeterPortRow> for MeterPort {
    type Error = StoreError;

    fn try_from(row: MeterPortRow) -> Result<Self, StoreError> {
        let unit = Unit::parse(&row.unit).ok_or_else(|| StoreError::InvalidValue {
            field: "homes_meterport.unit",
            value: row.unit.clone(),
        })?;
        let main = match (row.mainmeter_id, row.mainmeter_name, row.mainmeter_home_id) {
            (Some(id), Some(name), Some(home_id)) => Some(MeterRef {
                kind: MeterKind::Main,
                id,
                name,
                home_id,
            }),
            _ => None,
        };
        let sub = match (row.submeter_id, row.submeter_name, row.submeter_home_id) {
            (Some(id), Some(name), Some(home_id)) => Some(MeterRef {
                kind: MeterKind::Sub,
                id,
                name,
                home_id,
            }),
            _ => None,
        };
        Ok(MeterPort {
            id: row.id,
            name: row.name,
            resource_type: row.resource_type,
            unit,
            meter: main.or(sub),
        })
    }
}

#[derive(FromRow)]
struct SampleRow {
    timestamp: DateTime<Utc>,
    value: i64,
}

impl From<SampleRow> for Sample {
    fn from(row: SampleRow) -> Self {
        Sample::new(row.timestamp, row.value)
    }
}

#[derive(FromRow)]
struct GroupedSampleRow {
    group_key: i64,
    timestamp: DateTime<Utc>,
    value: i64,
}

#[derive(FromRow)]
struct VirtualEnergyPortRow {
    id: i64,
    consumption_id: Option<i64>,
    current_id: Option<i64>,
    voltage_id: Option<i64>,
    power_factor_id: Option<i64>,
}

fn required_link(value: Option<i64>, field: &'static str, port_id: i64) -> Result<i64, StoreError> {
    value.ok_or_else(|| StoreError::InvalidValue {
        field,
        value: format!("NULL on virtual port {port_id}"),
    })
}

impl TryFrom<VirtualEnergyPortRow> for VirtualEnergyPort {
    type Error = StoreError;

    fn try_from(row: VirtualEnergyPortRow) -> Result<Self, StoreError> {
        Ok(VirtualEnergyPort {
            id: row.id,
            consumption: required_link(row.consumption_id, "consumption_id", row.id)?,
            current: required_link(row.current_id, "current_id", row.id)?,
            voltage: required_link(row.voltage_id, "voltage_id", row.id)?,
            power_factor: required_link(row.power_factor_id, "power_factor_id", row.id)?,
        })
    }
}

#[derive(FromRow)]
struct FixedValuePortRow {
    id: i64,
    value: i64,
    resolution_in_seconds: i32,
}

#[derive(FromRow)]
struct TemperatureRow {
    temperature: i64,
    timestamp: DateTime<Utc>,
    submeter_name: String,
}

fn push_time_range(qb: &mut QueryBuilder<'_, Postgres>, range: TimeRange) {
    match range.start {
        Bound::Included(from) => {
            qb.push(" AND m.\"timestamp\" >= ").push_bind(from);
        }
        Bound::Excluded(from) => {
            qb.push(" AND m.\"timestamp\" > ").push_bind(from);
        }
        Bound::Unbounded => {}
    }
    match range.end {
        Bound::Included(to) => {
            qb.push(" AND m.\"timestamp\" <= ").push_bind(to);
        }
        Bound::Excluded(to) => {
            qb.push(" AND m.\"timestamp\" < ").push_bind(to);
        }
        Bound::Unbounded => {}
    }
}

/// Reads the Django-managed `homes_*` tables.
#[derive(Debug, Clone)]
pub struct PgMeasurementStore {
    pool: PgPool,
}

impl PgMeasurementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn meter_ports_where(
        &self,
        condition: &str,
        home_id: i64,
    ) -> Result<Vec<MeterPort>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(METER_PORT_SELECT);
        qb.push(condition).push_bind(home_id);
        qb.push(" ORDER BY p.id ASC");
        let rows: Vec<MeterPortRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(MeterPort::try_from).collect()
    }
}

#[async_trait]
impl MeasurementStore for PgMeasurementStore {
    async fn meter_port(&self, port_id: i64) -> Result<Option<MeterPort>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(METER_PORT_SELECT);
        qb.push(" WHERE p.id = ").push_bind(port_id);
        let row: Option<MeterPortRow> = qb.build_query_as().fetch_optional(&self.pool).await?;
        row.map(MeterPort::try_from).transpose()
    }

    async fn home_meter_ports(
        &self,
        home_id: i64,
        kind: MeterKind,
    ) -> Result<Vec<MeterPort>, StoreError> {
        let condition = match kind {
            MeterKind::Main => " WHERE mm.residential_home_id = ",
            MeterKind::Sub => " WHERE sm.residential_home_id = ",
        };
        self.meter_ports_where(condition, home_id).await
    }

    async fn production_meter_ports(&self, home_id: i64) -> Result<Vec<MeterPort>, StoreError> {
        self.meter_ports_where(
            r#"
            JOIN homes_energyproductionperiod epp ON epp.id = p.energy_production_period_id
            JOIN homes_appliance a ON a.id = epp.appliance_id
            WHERE a.residential_home_id = sm.residential_home_id
              AND sm.residential_home_id = "#,
            home_id,
        )
        .await
    }

    async fn port_has_samples(&self, port_id: i64) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM homes_measurement WHERE meter_port_id = $1)",
        )
        .bind(port_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn samples_for_port(
        &self,
        port_id: i64,
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT m.\"timestamp\" AS timestamp, m.value FROM homes_measurement m WHERE m.meter_port_id = ",
        );
        qb.push_bind(port_id);
        push_time_range(&mut qb, range);
        qb.push(" ORDER BY m.\"timestamp\" ASC");
        let rows: Vec<SampleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Sample::from).collect())
    }

    async fn samples_for_ports(
        &self,
        port_ids: &[i64],
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError> {
        if port_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT m.\"timestamp\" AS timestamp, m.value FROM homes_measurement m WHERE m.meter_port_id = ANY(",
        );
        qb.push_bind(port_ids.to_vec()).push(")");
        push_time_range(&mut qb, range);
        qb.push(" ORDER BY m.\"timestamp\" ASC");
        let rows: Vec<SampleRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Sample::from).collect())
    }

    async fn samples_for_ports_grouped_by(
        &self,
        port_ids: &[i64],
        key: GroupKey,
        range: TimeRange,
    ) -> Result<Vec<SampleGroup>, StoreError> {
        if port_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Postgres>::new(match key {
            GroupKey::MeterPort => {
                "SELECT m.meter_port_id::bigint AS group_key, m.\"timestamp\" AS timestamp, m.value \
                 FROM homes_measurement m WHERE m.meter_port_id = ANY("
            }
            GroupKey::Submeter => {
                "SELECT p.submeter_id::bigint AS group_key, m.\"timestamp\" AS timestamp, m.value \
                 FROM homes_measurement m JOIN homes_meterport p ON p.id = m.meter_port_id \
                 WHERE p.submeter_id IS NOT NULL AND m.meter_port_id = ANY("
            }
        });
        qb.push_bind(port_ids.to_vec()).push(")");
        push_time_range(&mut qb, range);
        qb.push(" ORDER BY group_key ASC, m.\"timestamp\" ASC");
        let rows: Vec<GroupedSampleRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut groups: Vec<SampleGroup> = Vec::new();
        for row in rows {
            let sample = Sample::new(row.timestamp, row.value);
            match groups.last_mut() {
                Some(group) if group.key == row.group_key => group.samples.push(sample),
                _ => groups.push(SampleGroup {
                    key: row.group_key,
                    samples: vec![sample],
                }),
            }
        }
        Ok(groups)
    }

    async fn virtual_energy_ports(
        &self,
        virtual_port_id: i64,
    ) -> Result<Vec<VirtualEnergyPort>, StoreError> {
        let rows: Vec<VirtualEnergyPortRow> = sqlx::query_as(
            r#"
            SELECT
                meterport_ptr_id::bigint AS id,
                consumption_id::bigint AS consumption_id,
                current_id::bigint AS current_id,
                voltage_id::bigint AS voltage_id,
                power_factor_id::bigint AS power_factor_id
            FROM homes_virtualenergyport
            WHERE meterport_ptr_id = $1
            "#,
        )
        .bind(virtual_port_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(VirtualEnergyPort::try_from).collect()
    }

    async fn fixed_value_port(&self, port_id: i64) -> Result<Option<FixedValuePort>, StoreError> {
        let row: Option<FixedValuePortRow> = sqlx::query_as(
            "SELECT id::bigint AS id, value, resolution_in_seconds FROM homes_fixedvaluemeterport WHERE id = $1",
        )
        .bind(port_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| FixedValuePort {
            id: row.id,
            value: row.value,
            resolution_in_seconds: i64::from(row.resolution_in_seconds),
        }))
    }

    async fn temperature_readings(
        &self,
        home_id: i64,
        range: TimeRange,
    ) -> Result<Vec<TemperatureReading>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT m.value AS temperature, m.\"timestamp\" AS timestamp, sm.name AS submeter_name \
             FROM homes_measurement m \
             JOIN homes_meterport p ON p.id = m.meter_port_id \
             JOIN homes_submeter sm ON sm.id = p.submeter_id \
             WHERE p.resource_type = ",
        );
        qb.push_bind(TEMPERATURE_RESOURCE)
            .push(" AND sm.residential_home_id = ")
            .push_bind(home_id);
        push_time_range(&mut qb, range);
        qb.push(" ORDER BY sm.name ASC, m.\"timestamp\" ASC");
        let rows: Vec<TemperatureRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| TemperatureReading {
                temperature: row.temperature,
                timestamp: row.timestamp,
                submeter_name: row.submeter_name,
            })
            .collect())
    }
}
