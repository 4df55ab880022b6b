#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use std::process::Command;

    #[test]
    fn test_cli_help_output() {
        let mut cmd = Command::cargo_bin("wapictl").unwrap();

        let assert_result = cmd.arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Options:"));
        assert!(help_output.contains("Commands:"));

        for group in [
            "csv",
            "task",
            "grid",
            "cert",
            "logs",
            "support-bundle",
            "member-config",
            "lease-history",
            "config",
        ] {
            assert!(help_output.contains(group), "missing {}", group);
        }

        assert!(help_output.contains("--grid-mgr"));
        assert!(help_output.contains("--password"));
        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
        assert!(help_output.contains("wapictl"));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        let subcommands = vec![
            ("csv", vec!["import", "export", "error-log", "check"]),
            ("task", vec!["status"]),
            ("grid", vec!["backup", "restore"]),
            ("cert", vec!["generate", "csr", "download", "upload"]),
            ("config", vec!["get", "path"]),
        ];

        for (subcommand, children) in subcommands {
            let mut cmd = Command::cargo_bin("wapictl").unwrap();
            let assert_result = cmd.arg(subcommand).arg("--help").assert().success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            assert!(help_output.contains("Usage:"));
            assert!(help_output.contains(subcommand));
            for child in children {
                assert!(
                    help_output.contains(child),
                    "'{}' help does not mention '{}'",
                    subcommand,
                    child
                );
            }
        }
    }

    #[test]
    fn test_wait_flags_documented() {
        let mut cmd = Command::cargo_bin("wapictl").unwrap();
        let assert_result = cmd
            .args(["csv", "import", "--help"])
            .assert()
            .success();
        let help_output = String::from_utf8_lossy(&assert_result.get_output().stdout).to_string();
        assert!(help_output.contains("--wait"));
        assert!(help_output.contains("--poll-interval"));
        assert!(help_output.contains("--poll-timeout"));
        assert!(help_output.contains("--operation"));
    }

    #[test]
    fn test_no_arguments_prints_help_and_fails() {
        let mut cmd = Command::cargo_bin("wapictl").unwrap();
        cmd.assert().failure();
    }
}
