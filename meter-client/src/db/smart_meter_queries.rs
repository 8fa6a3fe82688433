use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::SmartMeterRead;
use crate::error::{ClientError, ClientResult};

/// Row shape of `smart_meter_reads` (see `sql/smart_meter_reads.sql`).
///
/// QuestDB exposes `TIMESTAMP` over pgwire without a zone, hence the naive
/// timestamp; values are UTC.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredSmartMeterRead {
    pub ts: NaiveDateTime,
    pub device_id: i64,
    pub meter_reading: i64,
}

impl TryFrom<StoredSmartMeterRead> for SmartMeterRead {
    type Error = ClientError;

    fn try_from(row: StoredSmartMeterRead) -> Result<Self, Self::Error> {
        let meter_reading = u64::try_from(row.meter_reading).map_err(|_| ClientError::OutOfRange {
            field: "meter_reading",
            value: row.meter_reading.to_string(),
        })?;

        Ok(SmartMeterRead {
            meter_reading,
            timestamp: row.ts.and_utc(),
        })
    }
}

fn device_key(device_id: u64) -> ClientResult<i64> {
    i64::try_from(device_id).map_err(|_| ClientError::OutOfRange {
        field: "device_id",
        value: device_id.to_string(),
    })
}

/// Most recent read for a device, if any.
pub async fn latest_smart_meter_read(
    pool: &PgPool,
    device_id: u64,
) -> ClientResult<Option<SmartMeterRead>> {
    let row = sqlx::query_as::<_, StoredSmartMeterRead>(
        r#"
        SELECT
            ts,
            device_id,
            meter_reading
        FROM smart_meter_reads
        WHERE device_id = $1
        ORDER BY ts DESC
        LIMIT 1
        "#,
    )
    .bind(device_key(device_id)?)
    .fetch_optional(pool)
    .await?;

    row.map(SmartMeterRead::try_from).transpose()
}

/// Insert all reads for a device with a single multi-row statement.
pub async fn insert_smart_meter_reads(
    pool: &PgPool,
    device_id: u64,
    reads: &[SmartMeterRead],
) -> ClientResult<u64> {
    if reads.is_empty() {
        return Ok(0);
    }

    let device_id = device_key(device_id)?;
    let rows = reads
        .iter()
        .map(|r| {
            let meter_reading = i64::try_from(r.meter_reading).map_err(|_| ClientError::OutOfRange {
                field: "meter_reading",
                value: r.meter_reading.to_string(),
            })?;
            Ok((r.timestamp.naive_utc(), meter_reading))
        })
        .collect::<ClientResult<Vec<_>>>()?;

    let mut builder =
        QueryBuilder::<Postgres>::new("INSERT INTO smart_meter_reads (ts, device_id, meter_reading) ");
    builder.push_values(&rows, |mut b, (ts, meter_reading)| {
        b.push_bind(*ts).push_bind(device_id).push_bind(*meter_reading);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}
