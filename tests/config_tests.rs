use gst_switch_harness::config::{RecordFile, ServerConfig};
use gst_switch_harness::error::{Error, Result};
use std::io::Write;

#[test]
fn test_port_bounds() -> Result<()> {
    for port in [1u32, 3000, 65535] {
        let config = ServerConfig::builder().video_port(port).build()?;
        assert_eq!(u32::from(config.video_port()), port);
    }

    for bad in ["0", "65536", "-1", "", "not-a-port"] {
        let result = ServerConfig::builder().video_port(bad).build();
        assert!(
            matches!(result, Err(Error::InvalidConfig(_))),
            "video port '{}' should be rejected",
            bad
        );

        let result = ServerConfig::builder().audio_port(bad).build();
        assert!(
            matches!(result, Err(Error::InvalidConfig(_))),
            "audio port '{}' should be rejected",
            bad
        );
    }

    Ok(())
}

#[test]
fn test_ports_accept_strings_and_integers_equivalently() -> Result<()> {
    let from_int = ServerConfig::builder().video_port(3000).build()?;
    let from_str = ServerConfig::builder().video_port("3000").build()?;
    assert_eq!(from_int.video_port(), from_str.video_port());
    Ok(())
}

#[test]
fn test_controller_address() -> Result<()> {
    let config = ServerConfig::builder()
        .controller_address("tcp:host=::,port=5000")
        .build()?;
    assert_eq!(config.controller_address(), "tcp:host=::,port=5000");

    for bad in ["localhost", ""] {
        let result = ServerConfig::builder().controller_address(bad).build();
        assert!(
            matches!(result, Err(Error::InvalidConfig(_))),
            "controller address '{}' should be rejected",
            bad
        );
    }

    Ok(())
}

#[test]
fn test_record_file_tri_state() -> Result<()> {
    let disabled = ServerConfig::builder().record_file(false).build()?;
    assert_eq!(disabled.record_file(), &RecordFile::Disabled);
    assert!(!disabled
        .to_args("")
        .iter()
        .any(|a| a.starts_with("--record") || a.as_str() == "-r"));

    let default_name = ServerConfig::builder().record_file(true).build()?;
    assert_eq!(default_name.record_file(), &RecordFile::DefaultName);
    assert!(default_name.to_args("").contains(&"-r".to_string()));

    let named = ServerConfig::builder().record_file("clip.mp4").build()?;
    assert_eq!(named.record_file(), &RecordFile::Named("clip.mp4".to_string()));
    assert!(named.to_args("").contains(&"--record=clip.mp4".to_string()));

    let result = ServerConfig::builder().record_file("a/b.mp4").build();
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    Ok(())
}

#[test]
fn test_argv_ordering() -> Result<()> {
    let config = ServerConfig::builder()
        .video_port(3000)
        .audio_port(4000)
        .controller_address("tcp:host=::,port=5000")
        .record_file(true)
        .video_format("I420")
        .build()?;

    let args = config.to_args("");
    assert_eq!(
        args,
        vec![
            "--video-input-port=3000",
            "--audio-input-port=4000",
            "--controller-address=tcp:host=::,port=5000",
            "-r",
            "--video-format=I420",
        ]
    );

    Ok(())
}

#[test]
fn test_gst_option_leads_the_argv() -> Result<()> {
    let config = ServerConfig::builder().build()?;
    let args = config.to_args("--gst-debug=3");
    assert_eq!(args[0], "--gst-debug=3");
    assert_eq!(args[1], "--video-input-port=3000");

    // An empty option is not inserted as an argument
    let args = config.to_args("");
    assert_eq!(args[0], "--video-input-port=3000");

    Ok(())
}

#[test]
fn test_video_format_is_optional_passthrough() -> Result<()> {
    let config = ServerConfig::builder().build()?;
    assert!(config.video_format().is_none());
    assert!(!config.to_args("").iter().any(|a| a.starts_with("--video-format")));

    let config = ServerConfig::builder().video_format("I420").build()?;
    assert_eq!(config.video_format(), Some("I420"));

    Ok(())
}

#[test]
fn test_load_config_from_json_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(
        file,
        r#"{{
            "videoPort": "3000",
            "audioPort": 4000,
            "controllerAddress": "tcp:host=::,port=5000",
            "recordFile": "clip.mp4",
            "logToFile": false
        }}"#
    )
    .expect("write temp file");

    let config = ServerConfig::from_file(file.path())?;
    assert_eq!(config.video_port(), 3000);
    assert_eq!(config.audio_port(), 4000);
    assert_eq!(config.record_file(), &RecordFile::Named("clip.mp4".to_string()));
    assert!(!config.log_to_file());

    Ok(())
}

#[test]
fn test_json_config_is_validated() {
    let result = ServerConfig::parse_from_str(
        r#"{
            "videoPort": 0
        }"#,
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    let result = ServerConfig::parse_from_str(
        r#"{
            "controllerAddress": "localhost"
        }"#,
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
