fn main() -> anyhow::Result<()> {
    party_map_lib::run()
}
