use driver::RedisClient;

/// Example program storing and reading a flight in the `routes` hash of a
/// local Redis server.
///
/// Run it with a server listening on 127.0.0.1:6379, or pass another
/// `host port` pair as arguments.
fn main() {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port = args
        .next()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(6379);

    let mut client = RedisClient::connect_to(&host, port).unwrap();
    client.ping().unwrap();

    let flight = r#"{"name":"Boeing 737-46Q(SF)","registration":"RA-89051","start":"2016-01-07 9:00","tr":[[33.55,33],[37,24],[43,45]],"speed":"555"}"#;
    let created = client.hset("routes", "FV777", flight).unwrap();
    println!("FV777 {}", if created { "created" } else { "updated" });

    match client.hget("routes", "FV777").unwrap() {
        Some(document) => println!("FV777 => {}", document),
        None => println!("FV777 is missing"),
    }

    for (number, document) in client.hgetall("routes").unwrap() {
        println!("{}: {}", number, document);
    }
}
