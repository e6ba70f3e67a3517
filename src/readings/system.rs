use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{ReadingSource, SourceError};
use crate::models::{self, Sensor};

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";
const PROC_NET_DEV: &str = "/proc/net/dev";
const PROC_NET_TCP: [&str; 2] = ["/proc/net/tcp", "/proc/net/tcp6"];
const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

const SSH_PORT: u16 = 22;
/// Connection state code of an established TCP socket
const TCP_ESTABLISHED: &str = "01";

/// Cumulative CPU time counters, in clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    if fields.len() < 4 {
        return None;
    }

    Some(CpuTimes {
        // idle + iowait
        idle: fields[3] + fields.get(4).copied().unwrap_or(0),
        total: fields.iter().sum(),
    })
}

fn cpu_busy(last: CpuTimes, now: CpuTimes) -> Option<f64> {
    let total = now.total.checked_sub(last.total)?;
    let idle = now.idle.checked_sub(last.idle)?;

    if total == 0 {
        None
    } else {
        Some(1. - idle as f64 / total as f64)
    }
}

fn meminfo_field(meminfo: &str, name: &str) -> Option<u64> {
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

fn parse_memory_used(meminfo: &str) -> Option<f64> {
    let total = meminfo_field(meminfo, "MemTotal")?;
    let available = meminfo_field(meminfo, "MemAvailable")?;

    if total == 0 {
        None
    } else {
        Some(1. - available as f64 / total as f64)
    }
}

/// Temperature as a fraction of 100 °C
fn parse_temperature(millidegrees: &str) -> Option<f64> {
    let millidegrees: f64 = millidegrees.trim().parse().ok()?;
    Some(millidegrees / 100_000.)
}

/// Total received and transmitted bytes over all interfaces but loopback
fn parse_network_bytes(net_dev: &str) -> Option<u64> {
    let mut total = 0u64;

    for line in net_dev.lines().skip(2) {
        let (interface, counters) = line.split_once(':')?;
        if interface.trim() == "lo" {
            continue;
        }

        let counters: Vec<&str> = counters.split_whitespace().collect();
        let rx: u64 = counters.get(0)?.parse().ok()?;
        let tx: u64 = counters.get(8)?.parse().ok()?;
        total += rx + tx;
    }

    Some(total)
}

/// Throughput between two byte counts, as a fraction of `max_bytes` per second
fn network_rate(last_bytes: u64, bytes: u64, elapsed: Duration, max_bytes: u64) -> Option<f64> {
    let elapsed = elapsed.as_secs_f64();
    if elapsed <= 0. || max_bytes == 0 {
        return None;
    }

    // Counters reset when an interface goes away
    let rate = bytes.saturating_sub(last_bytes) as f64 / elapsed;
    Some(rate / max_bytes as f64)
}

/// Number of established connections on the local SSH port in a `/proc/net/tcp` table
fn count_ssh_sessions(tcp: &str) -> usize {
    tcp.lines()
        .skip(1)
        .filter(|line| {
            let mut fields = line.split_whitespace().skip(1);
            let local = fields.next();
            let state = fields.nth(1);

            let port = local
                .and_then(|local| local.rsplit(':').next())
                .and_then(|port| u16::from_str_radix(port, 16).ok());

            port == Some(SSH_PORT) && state == Some(TCP_ESTABLISHED)
        })
        .count()
}

async fn read_counters(path: &str) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(error) => {
            debug!(path = %path, error = %error, "cannot read counters");
            None
        }
    }
}

/// Readings from the Linux procfs and sysfs counters
pub struct SystemReadings {
    config: models::SystemSource,
    values: HashMap<Sensor, f64>,
    last_cpu: Option<CpuTimes>,
    last_network: Option<(u64, Instant)>,
}

impl SystemReadings {
    pub fn new(config: models::SystemSource) -> Self {
        Self {
            config,
            values: HashMap::new(),
            last_cpu: None,
            last_network: None,
        }
    }

    fn store(&mut self, sensor: Sensor, value: Option<f64>) {
        match value {
            Some(value) if !value.is_nan() => {
                self.values.insert(sensor, value.clamp(0., 1.));
            }
            _ => {
                self.values.remove(&sensor);
            }
        }
    }

    async fn refresh_cpu(&mut self) -> Option<f64> {
        let now = parse_cpu_times(&read_counters(PROC_STAT).await?)?;
        let last = self.last_cpu.replace(now)?;
        cpu_busy(last, now)
    }

    async fn refresh_network(&mut self) -> Option<f64> {
        let bytes = parse_network_bytes(&read_counters(PROC_NET_DEV).await?)?;
        let now = Instant::now();
        let (last_bytes, last_time) = self.last_network.replace((bytes, now))?;

        network_rate(
            last_bytes,
            bytes,
            now.duration_since(last_time),
            self.config.network_max_bytes,
        )
    }

    async fn refresh_sessions(&mut self) -> Option<f64> {
        let mut sessions = 0;
        let mut any = false;

        for path in PROC_NET_TCP.iter() {
            if let Some(table) = read_counters(path).await {
                sessions += count_ssh_sessions(&table);
                any = true;
            }
        }

        if any {
            Some(sessions as f64 / self.config.max_sessions as f64)
        } else {
            None
        }
    }
}

#[async_trait]
impl ReadingSource for SystemReadings {
    async fn refresh(&mut self) {
        let cpu = self.refresh_cpu().await;
        self.store(Sensor::Cpu, cpu);

        let memory = match read_counters(PROC_MEMINFO).await {
            Some(meminfo) => parse_memory_used(&meminfo),
            None => None,
        };
        self.store(Sensor::Memory, memory);

        let temperature = match read_counters(THERMAL_ZONE).await {
            Some(temperature) => parse_temperature(&temperature),
            None => None,
        };
        self.store(Sensor::Temperature, temperature);

        let network = self.refresh_network().await;
        self.store(Sensor::Network, network);

        let sessions = self.refresh_sessions().await;
        self.store(Sensor::Sessions, sessions);

        trace!(values = ?self.values, "refreshed system readings");
    }

    fn read(&self, channel: &models::Channel) -> Result<f64, SourceError> {
        self.values
            .get(&channel.sensor)
            .copied()
            .ok_or(SourceError::Unavailable(channel.sensor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, ChannelMode};

    const STAT: &str = "cpu  100 0 50 800 50 0 0 0 0 0
cpu0 50 0 25 400 25 0 0 0 0 0
intr 12345
";

    const MEMINFO: &str = "MemTotal:        1000000 kB
MemFree:          200000 kB
MemAvailable:     250000 kB
Buffers:           10000 kB
";

    const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 9999999     100    0    0    0     0          0         0  9999999     100    0    0    0     0       0          0
  eth0:    1000      10    0    0    0     0          0         0     500       5    0    0    0     0       0          0
 wlan0:     200       2    0    0    0     0          0         0     300       3    0    0    0     0       0          0
";

    const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 1 1 0000000000000000 100 0 0 10 0
   1: 0100A8C0:0016 0200A8C0:D431 01 00000000:00000000 02:0009C2B0 00000000     0        0 2 4 0000000000000000 20 4 30 10 -1
   2: 0100A8C0:0016 0300A8C0:D432 01 00000000:00000000 02:0009C2B0 00000000     0        0 3 4 0000000000000000 20 4 30 10 -1
   3: 0100A8C0:C350 0200A8C0:0016 01 00000000:00000000 02:0009C2B0 00000000  1000        0 4 4 0000000000000000 20 4 30 10 -1
";

    #[test]
    fn cpu_times() {
        let times = parse_cpu_times(STAT).unwrap();
        assert_eq!(times, CpuTimes { idle: 850, total: 1000 });

        let later = CpuTimes {
            idle: 850 + 75,
            total: 1000 + 100,
        };
        assert_eq!(cpu_busy(times, later), Some(0.25));
        assert_eq!(cpu_busy(times, times), None);
    }

    #[test]
    fn memory_used() {
        assert_eq!(parse_memory_used(MEMINFO), Some(0.75));
        assert_eq!(parse_memory_used("MemTotal: 10 kB\n"), None);
    }

    #[test]
    fn temperature() {
        assert_eq!(parse_temperature("45000\n"), Some(0.45));
        assert_eq!(parse_temperature("garbage"), None);
    }

    #[test]
    fn network_bytes() {
        assert_eq!(parse_network_bytes(NET_DEV), Some(2000));
    }

    #[test]
    fn network_rate_is_scaled() {
        let max = 1 << 20;

        // 512 KiB over 2 seconds is a quarter of 1 MiB/s
        assert_eq!(
            network_rate(1000, 1000 + 512 * 1024, Duration::from_secs(2), max),
            Some(0.25)
        );
        assert_eq!(network_rate(5000, 5000, Duration::from_secs(1), max), Some(0.));
        assert_eq!(network_rate(5000, 100, Duration::from_secs(1), max), Some(0.));
        assert_eq!(network_rate(0, 100, Duration::from_secs(0), max), None);

        // Above the configured maximum, clamped later by the source
        assert_eq!(
            network_rate(0, 3 << 20, Duration::from_secs(1), max),
            Some(3.)
        );
    }

    #[test]
    fn ssh_sessions() {
        // The listening socket and the outgoing connection do not count
        assert_eq!(count_ssh_sessions(TCP), 2);
    }

    #[test]
    fn readings_are_clamped() {
        let mut readings = SystemReadings::new(Default::default());
        readings.store(Sensor::Sessions, Some(5. / 3.));
        readings.store(Sensor::Cpu, Some(-0.1));
        readings.store(Sensor::Memory, Some(f64::NAN));

        let channel = |sensor| Channel::new("test", sensor, ChannelMode::Bar, &[0]);

        assert_eq!(readings.read(&channel(Sensor::Sessions)).unwrap(), 1.);
        assert_eq!(readings.read(&channel(Sensor::Cpu)).unwrap(), 0.);
        assert!(readings.read(&channel(Sensor::Memory)).is_err());
        assert!(readings.read(&channel(Sensor::Network)).is_err());
    }
}
