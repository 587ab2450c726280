use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::booking::parse_booking_date;
use crate::models::{Booking, BookingStatus, ClockTime, Court, NewCourt, PaymentStatus, Renter};

const DATE_FORMAT: &str = "%Y-%m-%d";

const BOOKING_COLUMNS: &str = "id, court_id, date, start_time, end_time, status, payment_status, \
     total_price, notes, renter_name, renter_phone, renter_email";

// ── Courts ──

pub fn create_court(conn: &Connection, court: &NewCourt) -> anyhow::Result<Court> {
    conn.execute(
        "INSERT INTO courts (name, court_type, venue, hourly_rate) VALUES (?1, ?2, ?3, ?4)",
        params![court.name, court.court_type, court.venue, court.hourly_rate],
    )?;
    let id = conn.last_insert_rowid();
    get_court(conn, id)?.context("court vanished after insert")
}

pub fn get_court(conn: &Connection, id: i64) -> anyhow::Result<Option<Court>> {
    let court = conn
        .query_row(
            "SELECT id, name, court_type, venue, hourly_rate, created_at FROM courts WHERE id = ?1",
            params![id],
            parse_court_row,
        )
        .optional()?;
    Ok(court)
}

pub fn list_courts(conn: &Connection) -> anyhow::Result<Vec<Court>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, court_type, venue, hourly_rate, created_at FROM courts ORDER BY name ASC, id ASC",
    )?;
    let rows = stmt.query_map([], parse_court_row)?;

    let mut courts = vec![];
    for row in rows {
        courts.push(row?);
    }
    Ok(courts)
}

fn parse_court_row(row: &rusqlite::Row) -> rusqlite::Result<Court> {
    Ok(Court {
        id: row.get(0)?,
        name: row.get(1)?,
        court_type: row.get(2)?,
        venue: row.get(3)?,
        hourly_rate: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// ── Bookings ──

/// Inserts `booking` and returns the id the database assigned; `booking.id`
/// is ignored.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<i64> {
    let renter = booking.renter.clone().unwrap_or_default();
    conn.execute(
        "INSERT INTO bookings (court_id, date, start_time, end_time, status, payment_status, total_price, notes, renter_name, renter_phone, renter_email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.court_id,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.start_time.to_string(),
            booking.end_time.to_string(),
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.total_price,
            booking.notes,
            renter.name,
            renter.phone,
            renter.email,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// Bookings of one court whose date falls in `[start, end]`, every status
/// included, ordered by date and start time.
pub fn get_bookings_in_range(
    conn: &Connection,
    court_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE court_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC, start_time ASC, id ASC"
    ))?;

    let rows = stmt.query_map(
        params![
            court_id,
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string()
        ],
        |row| Ok(parse_booking_row(row)),
    )?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: Option<BookingStatus>,
    payment_status: Option<PaymentStatus>,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET
           status = COALESCE(?1, status),
           payment_status = COALESCE(?2, payment_status),
           updated_at = datetime('now')
         WHERE id = ?3",
        params![
            status.map(|s| s.as_str()),
            payment_status.map(|p| p.as_str()),
            id
        ],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: i64 = row.get(0)?;
    let court_id: i64 = row.get(1)?;
    let date_str: String = row.get(2)?;
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let payment_str: String = row.get(6)?;
    let total_price: f64 = row.get(7)?;
    let notes: Option<String> = row.get(8)?;
    let renter = Renter {
        name: row.get(9)?,
        phone: row.get(10)?,
        email: row.get(11)?,
    };

    let date = parse_booking_date(&date_str).with_context(|| format!("booking {id}"))?;
    let start_time =
        ClockTime::parse(&start_str).with_context(|| format!("booking {id} start_time"))?;
    let end_time = ClockTime::parse(&end_str).with_context(|| format!("booking {id} end_time"))?;

    Ok(Booking {
        id,
        court_id,
        date,
        start_time,
        end_time,
        status: BookingStatus::parse(&status_str),
        payment_status: PaymentStatus::parse(&payment_str),
        total_price,
        notes,
        renter: (!renter.is_empty()).then_some(renter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn court(conn: &Connection) -> Court {
        create_court(
            conn,
            &NewCourt {
                name: "Court A".to_string(),
                court_type: Some("futsal".to_string()),
                venue: Some("North Hall".to_string()),
                hourly_rate: 120.0,
            },
        )
        .unwrap()
    }

    fn booking(court_id: i64, day: &str, start: &str, end: &str) -> Booking {
        Booking {
            id: 0,
            court_id,
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            start_time: ClockTime::parse(start).unwrap(),
            end_time: ClockTime::parse(end).unwrap(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total_price: 120.0,
            notes: Some("bring bibs".to_string()),
            renter: Some(Renter {
                name: Some("Alice".to_string()),
                phone: Some("+6281234".to_string()),
                email: None,
            }),
        }
    }

    #[test]
    fn test_courts_round_trip() {
        let conn = setup_db();
        let created = court(&conn);
        assert_eq!(created.name, "Court A");
        assert_eq!(get_court(&conn, created.id).unwrap(), Some(created.clone()));
        assert_eq!(list_courts(&conn).unwrap(), vec![created]);
        assert!(get_court(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_insert_and_fetch_booking() {
        let conn = setup_db();
        let c = court(&conn);
        let id = insert_booking(&conn, &booking(c.id, "2024-06-01", "09:00", "10:00")).unwrap();

        let stored = get_booking_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.start_time.to_string(), "09:00");
        assert_eq!(stored.renter.as_ref().and_then(|r| r.name.as_deref()), Some("Alice"));
        assert!(get_booking_by_id(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn test_range_is_inclusive_and_per_court() {
        let conn = setup_db();
        let c = court(&conn);
        let other = court(&conn);
        insert_booking(&conn, &booking(c.id, "2024-06-03", "10:00", "11:00")).unwrap();
        insert_booking(&conn, &booking(c.id, "2024-06-03", "08:00", "09:00")).unwrap();
        insert_booking(&conn, &booking(c.id, "2024-06-09", "08:00", "09:00")).unwrap();
        insert_booking(&conn, &booking(c.id, "2024-06-10", "08:00", "09:00")).unwrap();
        insert_booking(&conn, &booking(other.id, "2024-06-04", "08:00", "09:00")).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let found = get_bookings_in_range(&conn, c.id, start, end).unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].start_time.to_string(), "08:00");
        assert_eq!(found[1].start_time.to_string(), "10:00");
        assert!(found.iter().all(|b| b.court_id == c.id));
    }

    #[test]
    fn test_update_status() {
        let conn = setup_db();
        let c = court(&conn);
        let id = insert_booking(&conn, &booking(c.id, "2024-06-01", "09:00", "10:00")).unwrap();

        assert!(update_booking_status(&conn, id, Some(BookingStatus::Confirmed), None).unwrap());
        let b = get_booking_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.payment_status, PaymentStatus::Pending);

        assert!(update_booking_status(&conn, id, None, Some(PaymentStatus::Paid)).unwrap());
        let b = get_booking_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.payment_status, PaymentStatus::Paid);

        assert!(!update_booking_status(&conn, 404, Some(BookingStatus::Cancelled), None).unwrap());
    }
}
