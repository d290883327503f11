//! 旅行库的表结构与初始库存
//!
//! 仅在 flights 表不存在时建表并灌入数据，文件库重开不会重复插入。

use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
CREATE TABLE flights (
    flight_id INTEGER PRIMARY KEY AUTOINCREMENT,
    airline TEXT NOT NULL,
    flight_number TEXT NOT NULL,
    origin_airport TEXT NOT NULL,
    destination_airport TEXT NOT NULL,
    departure_date DATE NOT NULL,
    departure_time TIME NOT NULL,
    arrival_time TIME NOT NULL,
    duration_minutes INTEGER NOT NULL,
    base_price REAL NOT NULL,
    cabin_class TEXT NOT NULL,
    available_seats INTEGER NOT NULL,
    aircraft_type TEXT
);

CREATE TABLE hotels (
    hotel_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    address TEXT,
    rating REAL CHECK(rating >= 1 AND rating <= 5),
    price_per_night REAL NOT NULL,
    distance_to_center_km REAL,
    available_rooms INTEGER NOT NULL,
    has_wifi BOOLEAN DEFAULT 1,
    has_pool BOOLEAN DEFAULT 0,
    has_gym BOOLEAN DEFAULT 0,
    has_parking BOOLEAN DEFAULT 0,
    has_spa BOOLEAN DEFAULT 0,
    has_restaurant BOOLEAN DEFAULT 0,
    has_bar BOOLEAN DEFAULT 0,
    has_breakfast_included BOOLEAN DEFAULT 0
);

CREATE TABLE bookings (
    booking_id INTEGER PRIMARY KEY AUTOINCREMENT,
    booking_type TEXT NOT NULL,
    item_id INTEGER NOT NULL,
    customer_name TEXT NOT NULL,
    customer_email TEXT NOT NULL,
    booking_date DATETIME DEFAULT CURRENT_TIMESTAMP,
    status TEXT DEFAULT 'confirmed',
    confirmation_number TEXT UNIQUE NOT NULL,
    total_price REAL NOT NULL,
    special_requests TEXT
);

CREATE TABLE attractions (
    attraction_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    category TEXT NOT NULL,
    rating REAL,
    description TEXT,
    average_visit_hours REAL,
    entry_fee REAL,
    website TEXT
);
";

type FlightRow = (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str, i64, f64, &'static str, i64, &'static str);

const FLIGHTS: &[FlightRow] = &[
    // JFK -> LAX
    ("SkyHigh Airlines", "SH101", "JFK", "LAX", "2025-12-15", "06:00", "09:00", 360, 299.99, "economy", 45, "Boeing 737"),
    ("AirWave", "AW201", "JFK", "LAX", "2025-12-15", "09:30", "12:30", 360, 349.99, "economy", 32, "Airbus A320"),
    ("QuickJet", "QJ301", "JFK", "LAX", "2025-12-15", "12:00", "15:00", 360, 399.99, "economy", 28, "Boeing 737"),
    ("LuxAir", "LX401", "JFK", "LAX", "2025-12-15", "15:30", "18:30", 360, 1299.99, "business", 12, "Boeing 787"),
    ("SkyHigh Airlines", "SH102", "JFK", "LAX", "2025-12-16", "07:00", "10:00", 360, 319.99, "economy", 38, "Boeing 737"),
    ("AirWave", "AW202", "JFK", "LAX", "2025-12-16", "13:00", "16:00", 360, 359.99, "economy", 25, "Airbus A320"),
    ("QuickJet", "QJ302", "JFK", "LAX", "2025-12-17", "10:30", "13:30", 360, 289.99, "economy", 42, "Boeing 737"),
    ("LuxAir", "LX402", "JFK", "LAX", "2025-12-17", "18:00", "21:00", 360, 1199.99, "business", 8, "Boeing 787"),
    // LAX -> JFK
    ("SkyHigh Airlines", "SH151", "LAX", "JFK", "2025-12-18", "07:00", "15:20", 380, 279.99, "economy", 52, "Boeing 737"),
    ("AirWave", "AW251", "LAX", "JFK", "2025-12-18", "10:30", "18:50", 380, 329.99, "economy", 35, "Airbus A320"),
    ("QuickJet", "QJ351", "LAX", "JFK", "2025-12-19", "08:00", "16:20", 380, 269.50, "economy", 48, "Boeing 737"),
    ("LuxAir", "LX451", "LAX", "JFK", "2025-12-19", "14:00", "22:20", 380, 1099.99, "business", 10, "Boeing 787"),
    ("SkyHigh Airlines", "SH152", "LAX", "JFK", "2025-12-20", "11:00", "19:20", 380, 299.99, "economy", 40, "Boeing 737"),
    ("AirWave", "AW252", "LAX", "JFK", "2025-12-20", "16:00", "00:20", 380, 349.99, "economy", 30, "Airbus A320"),
    ("QuickJet", "QJ352", "LAX", "JFK", "2025-12-21", "09:00", "17:20", 380, 259.99, "economy", 45, "Boeing 737"),
    ("LuxAir", "LX452", "LAX", "JFK", "2025-12-21", "19:00", "03:20", 380, 1149.99, "business", 6, "Boeing 787"),
    // 其它航线
    ("Delta", "DL1234", "ATL", "JFK", "2025-12-15", "08:00", "10:30", 150, 199.99, "economy", 25, "Boeing 717"),
    ("American", "AA567", "ORD", "JFK", "2025-12-16", "14:00", "16:45", 165, 229.99, "economy", 18, "Airbus A319"),
    ("JetBlue", "B6123", "JFK", "BOS", "2025-12-17", "09:00", "09:50", 50, 129.99, "economy", 35, "Embraer 190"),
    ("United", "UA456", "JFK", "SFO", "2025-12-18", "11:00", "14:20", 320, 349.99, "economy", 22, "Boeing 757"),
    ("Alaska", "AS789", "LAX", "SEA", "2025-12-19", "10:00", "12:30", 150, 179.99, "economy", 28, "Boeing 737"),
    ("Southwest", "WN321", "LAX", "LAS", "2025-12-20", "16:00", "17:00", 60, 99.99, "economy", 40, "Boeing 737"),
    ("Spirit", "NK654", "DFW", "LAX", "2025-12-21", "13:00", "14:15", 135, 159.99, "economy", 45, "Airbus A320"),
    ("Frontier", "F9123", "DEN", "LAX", "2025-12-22", "17:30", "19:00", 150, 139.99, "economy", 30, "Airbus A321"),
    // 经 IAH 中转（总价最低）
    ("SkyHigh Airlines", "SH301", "JFK", "IAH", "2025-12-15", "06:00", "09:00", 360, 29.99, "economy", 45, "Boeing 737"),
    ("SkyHigh Airlines", "SH302", "IAH", "LAX", "2025-12-15", "10:00", "13:00", 360, 29.99, "economy", 45, "Boeing 737"),
];

/// (name, city, address, rating, price_per_night, distance_km, rooms, wifi, pool, gym, parking, spa, restaurant, bar, breakfast)
type HotelRow = (&'static str, &'static str, &'static str, f64, f64, f64, i64, [bool; 8]);

const HOTELS: &[HotelRow] = &[
    ("Beverly Hills Grand", "Los Angeles", "1 Rodeo Dr", 4.8, 499.99, 0.5, 10, [true, true, true, true, true, true, true, true]),
    ("Santa Monica Beach Hotel", "Los Angeles", "1 Ocean Ave", 4.7, 379.99, 2.0, 15, [true, true, true, true, true, true, true, true]),
    ("Hollywood Plaza", "Los Angeles", "7000 Hollywood Blvd", 4.3, 229.99, 3.5, 20, [true, true, true, true, false, true, true, false]),
    ("LAX Gateway Inn", "Los Angeles", "100 Airport Blvd", 4.0, 159.99, 1.2, 25, [true, true, true, true, false, true, true, true]),
    ("Downtown LA Lofts", "Los Angeles", "800 S Figueroa St", 4.5, 289.99, 1.8, 12, [true, false, true, true, false, true, true, false]),
    ("Venice Beach Hostel", "Los Angeles", "25 Windward Ave", 3.9, 79.99, 4.2, 40, [true, false, false, true, false, false, false, true]),
    ("The Standard, DTLA", "Los Angeles", "550 S Flower St", 4.4, 249.99, 2.1, 18, [true, true, true, true, false, true, true, false]),
    ("The Plaza", "New York", "768 5th Ave", 4.8, 699.99, 0.1, 5, [true, true, true, true, true, true, true, true]),
    ("Times Square Suites", "New York", "1568 Broadway", 4.2, 349.99, 0.2, 12, [true, false, true, false, false, true, true, false]),
    ("JFK Airport Hotel", "New York", "140-10 20th Ave", 3.8, 179.99, 2.5, 30, [true, true, true, true, false, true, true, false]),
    ("The Drake Chicago", "Chicago", "140 E Walton Pl", 4.6, 279.99, 1.2, 15, [true, true, true, true, true, true, true, false]),
    ("Seattle Waterfront Inn", "Seattle", "2411 Alaskan Way", 4.4, 229.99, 0.3, 20, [true, false, true, true, false, true, true, true]),
    ("The Fairmont San Francisco", "San Francisco", "950 Mason St", 4.7, 399.99, 0.8, 8, [true, true, true, true, true, true, true, true]),
];

type AttractionRow = (&'static str, &'static str, &'static str, f64, &'static str, f64, Option<f64>, &'static str);

const ATTRACTIONS: &[AttractionRow] = &[
    ("Hollywood Sign", "Los Angeles", "landmark", 4.7, "Iconic sign overlooking LA", 1.5, None, "hollywood.com"),
    ("Getty Center", "Los Angeles", "museum", 4.8, "Art museum with stunning architecture", 3.0, None, "getty.edu"),
    ("Universal Studios", "Los Angeles", "entertainment", 4.6, "Theme park and film studio", 8.0, Some(109.00), "universalstudios.com"),
    ("Santa Monica Pier", "Los Angeles", "landmark", 4.5, "Historic pier with amusement park", 2.5, None, "santamonicapier.org"),
    ("Griffith Observatory", "Los Angeles", "museum", 4.8, "Observatory with planetarium", 2.0, None, "griffithobservatory.org"),
    ("Vizcaya Museum & Gardens", "Miami", "historic site", 4.7, "European-style mansion and gardens", 3.0, Some(25.00), "vizcaya.org"),
    ("Everglades National Park", "Miami", "nature/park", 4.6, "Vast wetland ecosystem", 4.0, Some(30.00), "nps.gov/ever"),
    ("Art Deco Historic District", "Miami", "historic site", 4.5, "Colorful buildings in South Beach", 1.0, None, "artdeco.org"),
    ("Statue of Liberty", "New York", "landmark", 4.7, "Iconic national monument", 4.0, Some(24.50), "nps.gov/stli"),
    ("Metropolitan Museum of Art", "New York", "museum", 4.8, "One of the world's largest art museums", 4.0, Some(30.00), "metmuseum.org"),
    ("Central Park", "New York", "nature/park", 4.9, "Major urban park", 2.0, None, "centralparknyc.org"),
    ("Hollywood Sign", "Los Angeles", "landmark", 4.7, "Iconic sign overlooking LA", 1.5, None, "hollywood.com"),
    ("Getty Center", "Los Angeles", "museum", 4.8, "Art museum with stunning architecture", 3.0, None, "getty.edu"),
    ("Universal Studios", "Los Angeles", "entertainment", 4.6, "Theme park and film studio", 8.0, Some(109.00), "universalstudios.com"),
    ("Santa Monica Pier", "Los Angeles", "landmark", 4.5, "Historic pier with amusement park", 2.5, None, "santamonicapier.org"),
    ("Griffith Observatory", "Los Angeles", "museum", 4.8, "Observatory with planetarium", 2.0, None, "griffithobservatory.org"),
    ("Dodger Stadium", "Los Angeles", "entertainment", 4.7, "MLB stadium with great views of LA", 4.5, Some(65.00), "dodgers.com"),
    ("LA Live", "Los Angeles", "entertainment", 4.6, "Performing arts center", 1.0, None, "lalive.com"),
    ("The Getty Villa", "Los Angeles", "museum", 4.8, "Beautiful art museum in a park", 2.0, None, "getty.edu"),
];

fn schema_exists(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'flights'",
        [],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map(|name| name.is_some())
}

/// 建表并灌入初始库存；表已存在时什么都不做。返回是否执行了灌数。
pub fn seed_if_empty(conn: &mut Connection) -> rusqlite::Result<bool> {
    if schema_exists(conn)? {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO flights (airline, flight_number, origin_airport, destination_airport, departure_date,
                                  departure_time, arrival_time, duration_minutes, base_price,
                                  cabin_class, available_seats, aircraft_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for f in FLIGHTS {
            stmt.execute(params![f.0, f.1, f.2, f.3, f.4, f.5, f.6, f.7, f.8, f.9, f.10, f.11])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO hotels (name, city, address, rating, price_per_night, distance_to_center_km,
                                 available_rooms, has_wifi, has_pool, has_gym, has_parking, has_spa,
                                 has_restaurant, has_bar, has_breakfast_included)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )?;
        for h in HOTELS {
            let a = h.7;
            stmt.execute(params![h.0, h.1, h.2, h.3, h.4, h.5, h.6, a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO attractions (name, city, category, rating, description, average_visit_hours, entry_fee, website)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for a in ATTRACTIONS {
            stmt.execute(params![a.0, a.1, a.2, a.3, a.4, a.5, a.6, a.7])?;
        }
    }
    tx.commit()?;

    tracing::info!(
        flights = FLIGHTS.len(),
        hotels = HOTELS.len(),
        attractions = ATTRACTIONS.len(),
        "travel database seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(seed_if_empty(&mut conn).unwrap());
        assert!(!seed_if_empty(&mut conn).unwrap());

        let flights: i64 = conn.query_row("SELECT COUNT(*) FROM flights", [], |r| r.get(0)).unwrap();
        let hotels: i64 = conn.query_row("SELECT COUNT(*) FROM hotels", [], |r| r.get(0)).unwrap();
        let attractions: i64 = conn.query_row("SELECT COUNT(*) FROM attractions", [], |r| r.get(0)).unwrap();
        assert_eq!((flights, hotels, attractions), (26, 13, 19));
    }
}
