fn main() {
    soulful_journey::game::run();
}
