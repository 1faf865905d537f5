/// Test fixtures: representative XML payloads from the three feeds.
///
/// Field names are the upstream data service's contract and are decoded
/// verbatim. Values mirror what the service reports on a normal day, with a
/// few deliberately unhealthy alarm stations.
///
/// Reservoir feed shape:
///   ReservoirRtInfo
///     ReservoirName, RecDateTime     — verbatim strings
///     WaterLevel                     — m
///     Volume                         — 10^4 m³
///     VolumeRate                     — fraction (0–1) OR percentage (0–100)
///     Turbidity                      — NTU
///     AverageHourRainQty, AverageDayRainQty — mm, sometimes omitted
///
/// Alarm feed shape:
///   ArrayOfAlarmStationInfo
///     AlarmStationInfo[]
///       StationID, StationName, RecDateTime
///       CmdName, Powered, DC, Door, Amp, Trumpet — raw status strings
///
/// Rainfall feed shape:
///   EvapRainInfo
///     RecDateTime, Evaporation
///     EastSideRainQty, WestSideRainQty, WeirBodyRainQty,
///     WaterSupplyRainQty, OfficeRainQty, AverageRainQty — mm

/// Reservoir feed with storage rate already expressed as a percentage.
#[cfg(test)]
pub(crate) fn fixture_reservoir_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<ReservoirRtInfo>
  <ReservoirName>烏山頭水庫</ReservoirName>
  <RecDateTime>2023-10-27 10:00:00</RecDateTime>
  <WaterLevel>56.45</WaterLevel>
  <Volume>432.1</Volume>
  <VolumeRate>78.5</VolumeRate>
  <Turbidity>12</Turbidity>
  <AverageHourRainQty>0.6</AverageHourRainQty>
  <AverageDayRainQty>4.2</AverageDayRainQty>
</ReservoirRtInfo>"#
}

/// Reservoir feed using the older fractional storage-rate encoding, with the
/// optional rain averages omitted.
#[cfg(test)]
pub(crate) fn fixture_reservoir_fraction_xml() -> &'static str {
    r#"<ReservoirRtInfo>
  <RecDateTime>2023-10-27 11:00:00</RecDateTime>
  <WaterLevel>56.45</WaterLevel>
  <Volume>275.0</Volume>
  <VolumeRate>0.5</VolumeRate>
  <Turbidity>12</Turbidity>
</ReservoirRtInfo>"#
}

/// Four stations: healthy; power fault with door open; disconnected with no
/// other data; low battery voltage with a trumpet fault.
#[cfg(test)]
pub(crate) fn fixture_alarms_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfAlarmStationInfo>
  <AlarmStationInfo>
    <RecDateTime>2023-10-27 10:00:00</RecDateTime>
    <StationID>S001</StationID>
    <StationName>大壩控制站</StationName>
    <CmdName>通訊正常</CmdName>
    <Powered>正常</Powered>
    <DC>正常</DC>
    <Door>關閉</Door>
    <Amp>正常</Amp>
    <Trumpet>正常</Trumpet>
  </AlarmStationInfo>
  <AlarmStationInfo>
    <RecDateTime>2023-10-27 10:05:00</RecDateTime>
    <StationID>S002</StationID>
    <StationName>西口監測站</StationName>
    <CmdName>通訊正常</CmdName>
    <Powered>異常</Powered>
    <DC>正常</DC>
    <Door>開啟</Door>
    <Amp>正常</Amp>
    <Trumpet>正常</Trumpet>
  </AlarmStationInfo>
  <AlarmStationInfo>
    <RecDateTime>2023-10-27 09:55:00</RecDateTime>
    <StationID>S003</StationID>
    <StationName>東口監測站</StationName>
    <CmdName>斷線</CmdName>
    <Powered />
    <DC />
    <Door />
    <Amp />
    <Trumpet />
  </AlarmStationInfo>
  <AlarmStationInfo>
    <RecDateTime>2023-10-27 10:01:00</RecDateTime>
    <StationID>S004</StationID>
    <StationName>送水管理站</StationName>
    <CmdName>通訊正常</CmdName>
    <Powered>正常</Powered>
    <DC>電壓過低</DC>
    <Door>關閉</Door>
    <Amp>正常</Amp>
    <Trumpet>故障</Trumpet>
  </AlarmStationInfo>
</ArrayOfAlarmStationInfo>"#
}

/// Alarm feed that is well-formed but lists no stations.
#[cfg(test)]
pub(crate) fn fixture_alarms_empty_xml() -> &'static str {
    r#"<ArrayOfAlarmStationInfo></ArrayOfAlarmStationInfo>"#
}

#[cfg(test)]
pub(crate) fn fixture_rainfall_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8"?>
<EvapRainInfo>
  <RecDateTime>2023-10-27 10:00:00</RecDateTime>
  <Evaporation>2.5</Evaporation>
  <EastSideRainQty>12.0</EastSideRainQty>
  <WestSideRainQty>5.5</WestSideRainQty>
  <WeirBodyRainQty>0.0</WeirBodyRainQty>
  <WaterSupplyRainQty>1.2</WaterSupplyRainQty>
  <OfficeRainQty>0.0</OfficeRainQty>
  <AverageRainQty>3.74</AverageRainQty>
</EvapRainInfo>"#
}

/// Rainfall feed with a no-data sentinel at one gauge and a missing gauge.
#[cfg(test)]
pub(crate) fn fixture_rainfall_sparse_xml() -> &'static str {
    r#"<EvapRainInfo>
  <Evaporation>2.5</Evaporation>
  <EastSideRainQty>-999</EastSideRainQty>
  <WestSideRainQty>5.5</WestSideRainQty>
  <WeirBodyRainQty>--</WeirBodyRainQty>
  <WaterSupplyRainQty>1.2</WaterSupplyRainQty>
</EvapRainInfo>"#
}

/// What a reverse proxy returns when the data service is down. Not XML.
#[cfg(test)]
pub(crate) fn fixture_html_error_page() -> &'static str {
    r#"<html><head><meta charset="utf-8"><title>502 Bad Gateway</title></head>
<body><h1>502 Bad Gateway</h1><hr></body></html>"#
}
