//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;

const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
user:x:1000:1000:User:/home/user:/bin/bash
alice:x:1001:1001:Alice:/home/alice:/bin/bash
";

const OS_RELEASE: &str = "\
NAME=\"Ubuntu\"
VERSION=\"20.04 LTS (Focal Fossa)\"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME=\"Ubuntu 20.04 LTS\"
VERSION_ID=\"20.04\"
";

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1), kthreadd (PID 2), a bash shell (PID 1000)
    /// and a python server owned by alice (PID 1001).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/etc/passwd", PASSWD);
        fs.add_file("/etc/os-release", OS_RELEASE);

        fs.add_file(
            "/proc/version",
            "Linux version 5.4.0 (buildd@lcy01-amd64-030) (gcc version 9.3.0 (Ubuntu 9.3.0-10ubuntu2)) #46-Ubuntu SMP Fri Jul 10 00:24:02 UTC 2020\n",
        );
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        // PID 1: init, started at tick 1
        fs.add_process(
            1,
            "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 5000 2000 20 0 1 0 1 170000000 3000 18446744073709551615 1 1 0 0 0 0 671173123 4096 1260 0 0 0 17 0 0 0 10 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tsystemd
Pid:\t1
PPid:\t0
Uid:\t0\t0\t0\t0
Gid:\t0\t0\t0\t0
VmPeak:\t  170000 kB
VmSize:\t  166016 kB
VmRSS:\t   12000 kB
",
            "/sbin/init\0splash\0",
        );

        // PID 2: kernel thread, no memory map and no cmdline
        fs.add_process(
            2,
            "2 (kthreadd) S 0 0 0 0 -1 2129984 0 0 0 0 0 5 0 0 20 0 1 0 2 0 0 18446744073709551615 0 0 0 0 0 0 0 2147483647 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tkthreadd
Pid:\t2
PPid:\t0
Uid:\t0\t0\t0\t0
Gid:\t0\t0\t0\t0
",
            "",
        );

        // PID 1000: bash shell, started at 100000 ticks
        fs.add_process(
            1000,
            "1000 (bash) S 999 1000 1000 34816 1000 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25600000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tbash
Pid:\t1000
PPid:\t999
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
",
            "-bash\0",
        );

        // PID 1001: python server owned by alice
        fs.add_process(
            1001,
            "1001 (python3) S 1000 1001 1000 34816 1001 4194304 2000 0 5 0 300 120 0 0 20 0 2 0 150000 40000000 4000 18446744073709551615 0 0 0 0 0 0 0 16781312 2 0 0 0 17 3 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tpython3
Pid:\t1001
PPid:\t1000
Uid:\t1001\t1001\t1001\t1001
Gid:\t1001\t1001\t1001\t1001
VmPeak:\t   42000 kB
VmSize:\t   39062 kB
VmRSS:\t   16000 kB
",
            "/usr/bin/python3\0-m\0http.server\08080\0",
        );

        fs
    }

    /// Creates a system under high CPU load.
    pub fn high_cpu_load() -> Self {
        let mut fs = Self::typical_system();

        fs.add_file("/proc/uptime", "5000.00 1000.00\n");
        fs.add_file(
            "/proc/stat",
            "\
cpu  500000 1000 200000 100000 5000 2000 1000 300 0 0
cpu0 125000 250 50000 25000 1250 500 250 75 0 0
cpu1 125000 250 50000 25000 1250 500 250 75 0 0
cpu2 125000 250 50000 25000 1250 500 250 75 0 0
cpu3 125000 250 50000 25000 1250 500 250 75 0 0
ctxt 5000000
btime 1700000000
processes 50000
procs_running 8
procs_blocked 2
",
        );

        fs
    }

    /// Creates a system with memory pressure.
    pub fn memory_pressure() -> Self {
        let mut fs = Self::typical_system();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:          256000 kB
MemAvailable:     512000 kB
Buffers:           32000 kB
Cached:           128000 kB
SwapTotal:       4096000 kB
SwapFree:        1024000 kB
",
        );

        fs
    }

    /// Creates a system with a process whose UID has no passwd entry.
    pub fn with_orphan_uid() -> Self {
        let mut fs = Self::typical_system();

        fs.add_process(
            3000,
            "3000 (worker) R 1 3000 3000 0 -1 4194304 100 0 0 0 40 10 0 0 20 0 1 0 200000 10000000 500 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tworker
Pid:\t3000
PPid:\t1
Uid:\t3000\t3000\t3000\t3000
Gid:\t3000\t3000\t3000\t3000
VmSize:\t    9766 kB
",
            "./worker\0--threads\04\0",
        );

        fs
    }

    /// Creates processes with special characters in their names.
    pub fn with_special_names() -> Self {
        let mut fs = Self::typical_system();

        // Process with spaces in name
        fs.add_process(
            5000,
            "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\tWeb Content\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t 1953125 kB\n",
            "/usr/lib/firefox/firefox\0-contentproc\0",
        );

        // Process with parentheses in name
        fs.add_process(
            5001,
            "5001 (test(1) x) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\ttest(1) x\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t    9765 kB\n",
            "./test(1) x\0",
        );

        fs
    }
}
